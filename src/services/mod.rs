pub mod hashing;
pub mod ingest;
pub mod jwt;
pub mod link_signer;
pub mod mailer;
pub mod rate_limit;
pub mod security;

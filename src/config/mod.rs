pub mod database;
pub mod environment;

pub use database::{connect_options, init_db, DbPool};
pub use environment::{AppEnvironment, Config, DatabaseTarget};

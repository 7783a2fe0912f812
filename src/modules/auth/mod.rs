pub mod controller;
pub mod crud;
pub mod guard;
pub mod interface;
pub mod model;
pub mod routes;
pub mod schema;
pub mod service;

pub use guard::require_auth;
pub use interface::{AuthError, CredentialStore};
pub use routes::auth_routes;
pub use service::{FlowSettings, IdentityFlow};

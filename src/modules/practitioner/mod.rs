pub mod controller;
pub mod crud;
pub mod import;
pub mod interface;
pub mod model;
pub mod routes;
pub mod schema;

pub use interface::PractitionerStore;
pub use routes::practitioner_routes;

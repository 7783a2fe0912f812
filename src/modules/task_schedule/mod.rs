pub mod controller;
pub mod crud;
pub mod interface;
pub mod model;
pub mod routes;
pub mod scheduler;
pub mod service;

pub use interface::IngestStore;
pub use routes::task_schedule_routes;
pub use service::IngestSynchronizer;

pub mod auth;
pub mod extract;
pub mod practitioner;
pub mod response;
pub mod task_schedule;
pub mod users;

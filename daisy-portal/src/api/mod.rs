//! HTTP API handlers

pub mod attachments;
pub mod biography;
pub mod departments;
pub mod health;
pub mod students;

pub use attachments::attachment_routes;
pub use biography::biography_routes;
pub use departments::department_routes;
pub use health::health_routes;
pub use students::student_routes;

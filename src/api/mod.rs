//! HTTP API module: root health check and API documentation.

pub mod docs;
pub mod handlers;
pub mod routes;

pub use handlers::{HealthResponse, HEALTH_MESSAGE};
pub use routes::create_router;

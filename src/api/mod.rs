//! HTTP surface of the forecast service.

pub mod handlers;
pub mod routes;

pub use handlers::{PredictRequest, PredictResponse, USAGE_MESSAGE};
pub use routes::create_router;

//! HTTP API: router, shared state, handlers and error mapping.

pub mod error;
pub mod handlers;
mod routes;
mod state;

pub use error::{ApiError, ApiJson, ApiResult};
pub use routes::create_router;
pub use state::AppState;

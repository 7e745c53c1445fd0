//! A-Prime API crate - axum HTTP server and route handlers.
//!
//! Exposes session management and chat turns as JSON endpoints under
//! `/api`, plus a public health check.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;

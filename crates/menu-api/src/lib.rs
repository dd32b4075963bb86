//! # Menu API
//!
//! HTTP handlers, response envelopes and routing for the menu builder.

pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;

//! Middleware
//!
//! Caller identification and CORS.

pub mod auth;
pub mod cors;

pub use auth::RequestActor;
pub use cors::cors_middleware;

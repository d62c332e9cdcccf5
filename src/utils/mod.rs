//! Shared utilities
//!
//! Error handling, input validation and JWT verification.

pub mod errors;
pub mod jwt;
pub mod validation;

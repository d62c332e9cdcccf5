//! Data models
//!
//! Row types mapping the PostgreSQL schema in `migrations/`.

pub mod owner;
pub mod user;
pub mod user_log;
pub mod vehicle;

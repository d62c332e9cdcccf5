//! Database module
//!
//! Connection and schema migrations for PostgreSQL.

pub mod connection;

pub use connection::{connect, run_migrations};

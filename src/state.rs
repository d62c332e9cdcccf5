//! Shared application state
//!
//! Passed through the Axum router. The actor resolver and the audit logger
//! are injected so tests and tools can swap them.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::environment::EnvironmentConfig;
use crate::services::actor_resolver::{ActorResolver, SuperadminFallbackResolver};
use crate::services::audit::{AuditLog, PgAuditLog};
use crate::utils::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: EnvironmentConfig,
    pub actors: Arc<dyn ActorResolver>,
    pub audit: Arc<dyn AuditLog>,
}

impl AppState {
    pub fn new(pool: PgPool, config: EnvironmentConfig) -> Self {
        Self {
            actors: Arc::new(SuperadminFallbackResolver::new(pool.clone())),
            audit: Arc::new(PgAuditLog::new(pool.clone())),
            pool,
            config,
        }
    }

    pub fn with_collaborators(
        pool: PgPool,
        config: EnvironmentConfig,
        actors: Arc<dyn ActorResolver>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            pool,
            config,
            actors,
            audit,
        }
    }

    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig::from(&self.config)
    }
}

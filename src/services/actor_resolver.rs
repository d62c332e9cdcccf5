//! Actor resolution
//!
//! Decides which user a mutating operation is attributed to. Requests with a
//! valid bearer token act as that user; everything else (unauthenticated
//! calls, the background sweeper) falls back to the first superadmin, and to
//! the system actor (`None`) when no superadmin exists.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::models::user::UserRole;
use crate::repositories::user_repository::UserRepository;
use crate::utils::errors::{AppError, AppResult};

#[async_trait]
pub trait ActorResolver: Send + Sync {
    /// `authenticated` is the user id carried by the request token, if any
    async fn resolve(&self, authenticated: Option<Uuid>) -> AppResult<Option<Uuid>>;
}

/// Resolver backed by the `users` table
pub struct SuperadminFallbackResolver {
    pool: PgPool,
}

impl SuperadminFallbackResolver {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActorResolver for SuperadminFallbackResolver {
    async fn resolve(&self, authenticated: Option<Uuid>) -> AppResult<Option<Uuid>> {
        let users = UserRepository::new(self.pool.clone());

        if let Some(user_id) = authenticated {
            return match users.find_by_id(user_id).await? {
                Some(user) => Ok(Some(user.id)),
                None => Err(AppError::Unauthorized("User not found".to_string())),
            };
        }

        let fallback = users.find_first_by_role(UserRole::Superadmin).await?;
        debug!("No authenticated user, acting as {:?}", fallback.as_ref().map(|u| &u.username));
        Ok(fallback.map(|user| user.id))
    }
}

/// Resolver with a fixed fallback, for tests and tools without a database
pub struct StaticActorResolver {
    pub fallback: Option<Uuid>,
}

#[async_trait]
impl ActorResolver for StaticActorResolver {
    async fn resolve(&self, authenticated: Option<Uuid>) -> AppResult<Option<Uuid>> {
        Ok(authenticated.or(self.fallback))
    }
}

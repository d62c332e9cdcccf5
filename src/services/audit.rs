//! Activity logging
//!
//! Controllers hand a finished [`UserLogEntry`] to the injected [`AuditLog`]
//! after each mutating operation. Audit failures never fail the request.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::Mutex;
use tracing::warn;

use crate::models::user_log::UserLogEntry;
use crate::repositories::user_log_repository::UserLogRepository;

#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn record(&self, entry: UserLogEntry);
}

/// Writes entries to `user_logs`
pub struct PgAuditLog {
    pool: PgPool,
}

impl PgAuditLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLog for PgAuditLog {
    async fn record(&self, entry: UserLogEntry) {
        let repository = UserLogRepository::new(self.pool.clone());
        if let Err(e) = repository.insert(&entry).await {
            warn!("⚠️ Could not write activity log {:?}: {}", entry.action, e);
        }
    }
}

/// Keeps entries in memory
#[derive(Clone, Default)]
pub struct MemoryAuditLog {
    entries: Arc<Mutex<Vec<UserLogEntry>>>,
}

impl MemoryAuditLog {
    pub async fn entries(&self) -> Vec<UserLogEntry> {
        self.entries.lock().await.clone()
    }
}

#[async_trait]
impl AuditLog for MemoryAuditLog {
    async fn record(&self, entry: UserLogEntry) {
        self.entries.lock().await.push(entry);
    }
}

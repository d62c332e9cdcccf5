//! Batch expiration sweep
//!
//! Recomputes the status of every live vehicle and persists the rows whose
//! stored status drifted (typically active → expired as time passes).

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::models::user_log::{LogAction, LogOutcome, UserLogEntry};
use crate::models::vehicle::{StatusChange, Vehicle, VehicleStatus};
use crate::repositories::vehicle_repository::{VehicleQuery, VehicleRepository};
use crate::services::actor_resolver::ActorResolver;
use crate::services::audit::AuditLog;
use crate::services::vehicle_status::status_for_history;
use crate::utils::errors::AppResult;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub scanned: usize,
    pub updated: u64,
    pub active: usize,
    pub expired: usize,
}

/// Statuses that differ from what is stored, plus the report counters
pub fn plan_sweep(vehicles: &[Vehicle], now: DateTime<Utc>) -> (Vec<StatusChange>, SweepReport) {
    let mut report = SweepReport {
        scanned: vehicles.len(),
        ..SweepReport::default()
    };
    let mut changes = Vec::new();

    for vehicle in vehicles {
        let status = status_for_history(&vehicle.plate_no, vehicle.renewals(), vehicle.status_type, now);
        match status {
            VehicleStatus::Active => report.active += 1,
            VehicleStatus::Expired => report.expired += 1,
        }
        if status != vehicle.vehicle_status {
            changes.push(StatusChange {
                vehicle_id: vehicle.id,
                status,
                observed_at: vehicle.updated_at,
            });
        }
    }

    (changes, report)
}

pub async fn run_sweep(pool: &PgPool, now: DateTime<Utc>) -> AppResult<SweepReport> {
    let repository = VehicleRepository::new(pool.clone());
    let vehicles = repository.list(&VehicleQuery::default()).await?;

    let (changes, mut report) = plan_sweep(&vehicles, now);
    report.updated = repository.update_statuses(&changes).await?;

    info!(
        "🧹 Status sweep: {} scanned, {} updated ({} active, {} expired)",
        report.scanned, report.updated, report.active, report.expired
    );
    Ok(report)
}

/// Run the sweep every `every`, attributing it to the fallback actor
pub fn spawn_status_sweeper(
    pool: PgPool,
    actors: Arc<dyn ActorResolver>,
    audit: Arc<dyn AuditLog>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;

            let (outcome, details) = match run_sweep(&pool, Utc::now()).await {
                Ok(report) => (
                    LogOutcome::Success,
                    format!("Scheduled sweep updated {} of {} vehicles", report.updated, report.scanned),
                ),
                Err(e) => {
                    error!("❌ Scheduled status sweep failed: {}", e);
                    (LogOutcome::Failure, format!("Scheduled sweep failed: {}", e))
                }
            };

            let user_id = actors.resolve(None).await.unwrap_or(None);
            audit
                .record(UserLogEntry {
                    user_id,
                    action: LogAction::StatusSweep,
                    ip_address: None,
                    outcome,
                    details,
                })
                .await;
        }
    })
}

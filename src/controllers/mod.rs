pub mod owner_controller;
pub mod vehicle_controller;

use tracing::warn;
use uuid::Uuid;

use crate::middleware::auth::RequestActor;
use crate::models::user_log::{LogAction, LogOutcome, UserLogEntry};
use crate::services::audit::AuditLog;
use crate::utils::errors::AppResult;

/// Write the activity log entry for a finished mutation
pub(crate) async fn record_outcome<T>(
    audit: &dyn AuditLog,
    caller: &RequestActor,
    actor: Option<Uuid>,
    action: LogAction,
    result: &AppResult<T>,
    describe: impl FnOnce(&T) -> String,
) {
    let (outcome, details) = match result {
        Ok(value) => (LogOutcome::Success, describe(value)),
        Err(e) => {
            warn!("❌ {:?} failed: {}", action, e);
            (LogOutcome::Failure, e.to_string())
        }
    };

    audit
        .record(UserLogEntry {
            user_id: actor,
            action,
            ip_address: caller.ip_address.clone(),
            outcome,
            details,
        })
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::audit::MemoryAuditLog;
    use crate::utils::errors::AppError;

    #[tokio::test]
    async fn test_record_outcome_success_and_failure() {
        let audit = MemoryAuditLog::default();
        let caller = RequestActor {
            user_id: None,
            ip_address: Some("10.0.0.9".to_string()),
        };
        let actor = Some(Uuid::new_v4());

        let ok: AppResult<u32> = Ok(3);
        record_outcome(&audit, &caller, actor, LogAction::StatusSweep, &ok, |n| format!("{} updated", n)).await;

        let failed: AppResult<u32> = Err(AppError::NotFound("Vehicle missing".to_string()));
        record_outcome(&audit, &caller, actor, LogAction::RenewVehicle, &failed, |_| unreachable!()).await;

        let entries = audit.entries().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].outcome, LogOutcome::Success);
        assert_eq!(entries[0].details, "3 updated");
        assert_eq!(entries[0].ip_address.as_deref(), Some("10.0.0.9"));
        assert_eq!(entries[1].outcome, LogOutcome::Failure);
        assert_eq!(entries[1].user_id, actor);
        assert!(entries[1].details.contains("Vehicle missing"));
    }
}

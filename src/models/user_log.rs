//! Activity log entries (`user_logs` table)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "log_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LogAction {
    AddVehicle,
    UpdateVehicle,
    RenewVehicle,
    TransferVehicle,
    DeleteVehicle,
    RestoreVehicle,
    StatusSweep,
    AddOwner,
    UpdateOwner,
    DeleteOwner,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "log_outcome", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LogOutcome {
    Success,
    Failure,
}

/// Entry handed to the audit logger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserLogEntry {
    pub user_id: Option<Uuid>,
    pub action: LogAction,
    pub ip_address: Option<String>,
    pub outcome: LogOutcome,
    pub details: String,
}


//! Vehicle model
//!
//! Maps the `vehicles` table. The renewal history lives in a JSONB column and
//! the owner link is mirrored on the owner side (`owners.vehicle_ids`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Registration status - maps the `vehicle_status` ENUM
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "vehicle_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    Active,
    Expired,
}

/// Plate regime flag - maps the `status_type` ENUM
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "status_type", rename_all = "lowercase")]
pub enum StatusType {
    #[default]
    Old,
    New,
}

/// One renewal event. `processed_by = None` is the system actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewalRecord {
    pub date: DateTime<Utc>,
    pub processed_by: Option<Uuid>,
}

/// Vehicle row
#[derive(Debug, Clone, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub plate_no: String,
    pub file_no: Option<String>,
    pub engine_no: Option<String>,
    pub chassis_no: Option<String>,
    pub make: Option<String>,
    pub body_type: Option<String>,
    pub color: Option<String>,
    pub classification: Option<String>,
    pub renewal_dates: Json<Vec<RenewalRecord>>,
    pub status_type: StatusType,
    pub vehicle_status: VehicleStatus,
    pub owner_id: Uuid,
    pub previous_owner_id: Option<Uuid>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn renewals(&self) -> &[RenewalRecord] {
        &self.renewal_dates.0
    }
}

/// Recomputed status for one row, valid only while the row still carries
/// the `updated_at` it was computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub vehicle_id: Uuid,
    pub status: VehicleStatus,
    pub observed_at: DateTime<Utc>,
}

/// Values for a new vehicle row, already normalized and with status computed
#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub plate_no: String,
    pub file_no: Option<String>,
    pub engine_no: Option<String>,
    pub chassis_no: Option<String>,
    pub make: Option<String>,
    pub body_type: Option<String>,
    pub color: Option<String>,
    pub classification: Option<String>,
    pub renewal_dates: Vec<RenewalRecord>,
    pub status_type: StatusType,
    pub vehicle_status: VehicleStatus,
    pub owner_id: Uuid,
}

/// Updatable columns, merged with the current row. Ownership changes go
/// through the ownership service instead.
#[derive(Debug, Clone)]
pub struct VehicleChanges {
    pub plate_no: String,
    pub file_no: Option<String>,
    pub engine_no: Option<String>,
    pub chassis_no: Option<String>,
    pub make: Option<String>,
    pub body_type: Option<String>,
    pub color: Option<String>,
    pub classification: Option<String>,
    pub renewal_dates: Vec<RenewalRecord>,
    pub status_type: StatusType,
    pub vehicle_status: VehicleStatus,
}

impl From<&Vehicle> for VehicleChanges {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            plate_no: vehicle.plate_no.clone(),
            file_no: vehicle.file_no.clone(),
            engine_no: vehicle.engine_no.clone(),
            chassis_no: vehicle.chassis_no.clone(),
            make: vehicle.make.clone(),
            body_type: vehicle.body_type.clone(),
            color: vehicle.color.clone(),
            classification: vehicle.classification.clone(),
            renewal_dates: vehicle.renewal_dates.0.clone(),
            status_type: vehicle.status_type,
            vehicle_status: vehicle.vehicle_status,
        }
    }
}

//! Plate/renewal status calculator
//!
//! Pure functions. Single fetch, bulk listing and the expiration sweep all go
//! through [`calculate_status`] so the status never depends on the entry point.

use chrono::{DateTime, Duration, Utc};

use crate::models::vehicle::{RenewalRecord, StatusType, VehicleStatus};

/// Validity of a permanent (alphanumeric) plate, in days
pub const PERMANENT_PLATE_VALIDITY_DAYS: i64 = 1095;
/// Validity of a temporary (all-digit) plate, in days
pub const TEMPORARY_PLATE_VALIDITY_DAYS: i64 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlateKind {
    Permanent,
    Temporary,
}

impl PlateKind {
    /// A plate with at least one letter is permanent, otherwise temporary
    pub fn classify(plate: &str) -> Option<Self> {
        let plate = plate.trim();
        if plate.is_empty() {
            return None;
        }

        if plate.chars().any(|c| c.is_alphabetic()) {
            Some(PlateKind::Permanent)
        } else {
            Some(PlateKind::Temporary)
        }
    }

    pub fn validity_days(&self, status_type: StatusType) -> i64 {
        // Old and New plates share the same windows
        match (self, status_type) {
            (PlateKind::Permanent, StatusType::Old | StatusType::New) => PERMANENT_PLATE_VALIDITY_DAYS,
            (PlateKind::Temporary, StatusType::Old | StatusType::New) => TEMPORARY_PLATE_VALIDITY_DAYS,
        }
    }
}

/// Chronologically latest renewal date, independent of array order
pub fn latest_renewal_date(renewals: &[RenewalRecord]) -> Option<DateTime<Utc>> {
    renewals.iter().map(|r| r.date).max()
}

/// Instant from which the registration counts as expired
pub fn expiration_date(
    plate: &str,
    latest_renewal: Option<DateTime<Utc>>,
    status_type: StatusType,
) -> Option<DateTime<Utc>> {
    let kind = PlateKind::classify(plate)?;
    let renewed = latest_renewal?;
    Some(renewed + Duration::days(kind.validity_days(status_type)))
}

/// Status of a registration at `now`.
///
/// Active while `now` is strictly before `latest_renewal + validity`. Missing
/// plates and missing renewal dates are expired.
pub fn calculate_status(
    plate: &str,
    latest_renewal: Option<DateTime<Utc>>,
    status_type: StatusType,
    now: DateTime<Utc>,
) -> VehicleStatus {
    match expiration_date(plate, latest_renewal, status_type) {
        Some(expires_at) if now < expires_at => VehicleStatus::Active,
        _ => VehicleStatus::Expired,
    }
}

/// [`calculate_status`] over a full renewal history
pub fn status_for_history(
    plate: &str,
    renewals: &[RenewalRecord],
    status_type: StatusType,
    now: DateTime<Utc>,
) -> VehicleStatus {
    calculate_status(plate, latest_renewal_date(renewals), status_type, now)
}

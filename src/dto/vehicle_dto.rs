use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::vehicle::{RenewalRecord, StatusType, Vehicle, VehicleStatus};
use crate::services::renewal_history::RenewalDatesInput;
use crate::services::vehicle_status::{expiration_date, latest_renewal_date, status_for_history};
use crate::utils::validation::{empty_string_as_none, patch_field, validate_plate_number};

// Vehicle registration request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(custom = "validate_plate_number")]
    pub plate_no: String,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(length(max = 50))]
    pub file_no: Option<String>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(length(max = 50))]
    pub engine_no: Option<String>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(length(max = 50))]
    pub chassis_no: Option<String>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(length(max = 100))]
    pub make: Option<String>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(length(max = 100))]
    pub body_type: Option<String>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(length(max = 50))]
    pub color: Option<String>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(length(max = 50))]
    pub classification: Option<String>,

    #[serde(default, alias = "date_of_renewal", deserialize_with = "empty_string_as_none")]
    pub renewal_dates: Option<RenewalDatesInput>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub status_type: Option<StatusType>,

    pub owner_id: Uuid,
}

impl CreateVehicleRequest {
    pub fn status_type(&self) -> StatusType {
        self.status_type.unwrap_or_default()
    }
}

// Vehicle update request: absent = keep, "" = clear
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(custom = "validate_plate_number")]
    pub plate_no: Option<String>,

    #[serde(default, deserialize_with = "patch_field")]
    pub file_no: Option<Option<String>>,

    #[serde(default, deserialize_with = "patch_field")]
    pub engine_no: Option<Option<String>>,

    #[serde(default, deserialize_with = "patch_field")]
    pub chassis_no: Option<Option<String>>,

    #[serde(default, deserialize_with = "patch_field")]
    pub make: Option<Option<String>>,

    #[serde(default, deserialize_with = "patch_field")]
    pub body_type: Option<Option<String>>,

    #[serde(default, deserialize_with = "patch_field")]
    pub color: Option<Option<String>>,

    #[serde(default, deserialize_with = "patch_field")]
    pub classification: Option<Option<String>>,

    #[serde(default, alias = "date_of_renewal", deserialize_with = "empty_string_as_none")]
    pub renewal_dates: Option<RenewalDatesInput>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub status_type: Option<StatusType>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub owner_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct RenewVehicleRequest {
    #[serde(alias = "date_of_renewal")]
    pub renewal_dates: RenewalDatesInput,
}

#[derive(Debug, Deserialize)]
pub struct TransferVehicleRequest {
    pub new_owner_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
pub struct VehicleFilters {
    pub status: Option<VehicleStatus>,
    pub owner_id: Option<Uuid>,
    pub plate: Option<String>,
    pub include_deleted: Option<bool>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteVehicleQuery {
    #[serde(default)]
    pub permanent: bool,
}

// Vehicle response, status recomputed on the way out
#[derive(Debug, Clone, Serialize)]
pub struct VehicleResponse {
    pub id: Uuid,
    pub plate_no: String,
    pub file_no: Option<String>,
    pub engine_no: Option<String>,
    pub chassis_no: Option<String>,
    pub make: Option<String>,
    pub body_type: Option<String>,
    pub color: Option<String>,
    pub classification: Option<String>,
    pub renewal_dates: Vec<RenewalRecord>,
    pub latest_renewal_date: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub status_type: StatusType,
    pub vehicle_status: VehicleStatus,
    pub owner_id: Uuid,
    pub previous_owner_id: Option<Uuid>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VehicleResponse {
    /// Build the response with the status recomputed at `now`
    pub fn at(vehicle: Vehicle, now: DateTime<Utc>) -> Self {
        let renewals = vehicle.renewal_dates.0;
        let latest = latest_renewal_date(&renewals);

        Self {
            vehicle_status: status_for_history(&vehicle.plate_no, &renewals, vehicle.status_type, now),
            expires_at: expiration_date(&vehicle.plate_no, latest, vehicle.status_type),
            latest_renewal_date: latest,
            id: vehicle.id,
            plate_no: vehicle.plate_no,
            file_no: vehicle.file_no,
            engine_no: vehicle.engine_no,
            chassis_no: vehicle.chassis_no,
            make: vehicle.make,
            body_type: vehicle.body_type,
            color: vehicle.color,
            classification: vehicle.classification,
            renewal_dates: renewals,
            status_type: vehicle.status_type,
            owner_id: vehicle.owner_id,
            previous_owner_id: vehicle.previous_owner_id,
            deleted_at: vehicle.deleted_at,
            created_at: vehicle.created_at,
            updated_at: vehicle.updated_at,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VehicleStatsResponse {
    pub total: usize,
    pub active: usize,
    pub expired: usize,
    pub deleted: usize,
}

impl VehicleStatsResponse {
    pub fn from_responses(vehicles: &[VehicleResponse]) -> Self {
        vehicles.iter().fold(Self::default(), |mut stats, v| {
            stats.total += 1;
            if v.deleted_at.is_some() {
                stats.deleted += 1;
            } else {
                match v.vehicle_status {
                    VehicleStatus::Active => stats.active += 1,
                    VehicleStatus::Expired => stats.expired += 1,
                }
            }
            stats
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::renewal_history::initial_renewals;
    use chrono::{Duration, TimeZone};
    use sqlx::types::Json;

    fn stored_vehicle(plate: &str, renewals: Vec<RenewalRecord>) -> Vehicle {
        let created = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        Vehicle {
            id: Uuid::new_v4(),
            plate_no: plate.to_string(),
            file_no: None,
            engine_no: None,
            chassis_no: None,
            make: Some("Toyota".to_string()),
            body_type: None,
            color: None,
            classification: None,
            renewal_dates: Json(renewals),
            status_type: StatusType::Old,
            // Stale on purpose
            vehicle_status: VehicleStatus::Active,
            owner_id: Uuid::new_v4(),
            previous_owner_id: None,
            deleted_at: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_create_request_defaults() {
        let request: CreateVehicleRequest = serde_json::from_str(&format!(
            r#"{{"plate_no": "abc 1234", "file_no": "", "color": "Red", "owner_id": "{}"}}"#,
            Uuid::new_v4()
        ))
        .unwrap();

        assert_eq!(request.status_type(), StatusType::Old);
        assert_eq!(request.file_no, None);
        assert_eq!(request.color.as_deref(), Some("Red"));
        assert!(request.renewal_dates.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_request_rejects_bad_plate() {
        let request: CreateVehicleRequest = serde_json::from_str(&format!(
            r#"{{"plate_no": "A#1", "owner_id": "{}", "status_type": "New", "date_of_renewal": "2024-01-01"}}"#,
            Uuid::new_v4()
        ))
        .unwrap();

        assert_eq!(request.status_type(), StatusType::New);
        assert!(request.renewal_dates.is_some());
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("plate_no"));
    }

    #[test]
    fn test_create_request_blank_renewal_and_status_type() {
        let request: CreateVehicleRequest = serde_json::from_str(&format!(
            r#"{{"plate_no": "NBA 1234", "renewal_dates": "", "status_type": "", "owner_id": "{}"}}"#,
            Uuid::new_v4()
        ))
        .unwrap();

        assert!(request.renewal_dates.is_none());
        assert_eq!(request.status_type(), StatusType::Old);
        assert!(request.validate().is_ok());

        let history = initial_renewals(request.renewal_dates.as_ref(), None).unwrap();
        assert!(history.is_empty());
        let now = Utc::now();
        assert_eq!(
            status_for_history(&request.plate_no, &history, request.status_type(), now),
            VehicleStatus::Expired
        );
    }

    #[test]
    fn test_update_request_blank_structured_fields_are_absent() {
        let request: UpdateVehicleRequest = serde_json::from_str(
            r#"{"plate_no": "", "renewal_dates": " ", "status_type": "", "owner_id": ""}"#,
        )
        .unwrap();

        assert!(request.plate_no.is_none());
        assert!(request.renewal_dates.is_none());
        assert!(request.status_type.is_none());
        assert!(request.owner_id.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_update_request_patch_semantics() {
        let request: UpdateVehicleRequest =
            serde_json::from_str(r#"{"color": "", "make": "Honda"}"#).unwrap();
        assert_eq!(request.color, Some(None));
        assert_eq!(request.make, Some(Some("Honda".to_string())));
        assert_eq!(request.engine_no, None);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_response_recomputes_status() {
        let now = Utc.with_ymd_and_hms(2025, 3, 15, 0, 0, 0).unwrap();
        let renewed = now - Duration::days(400);
        let vehicle = stored_vehicle(
            "123456",
            vec![RenewalRecord { date: renewed, processed_by: None }],
        );

        let response = VehicleResponse::at(vehicle, now);
        assert_eq!(response.vehicle_status, VehicleStatus::Expired);
        assert_eq!(response.latest_renewal_date, Some(renewed));
        assert_eq!(response.expires_at, Some(renewed + Duration::days(365)));
    }

    #[test]
    fn test_stats_from_responses() {
        let now = Utc.with_ymd_and_hms(2025, 3, 15, 0, 0, 0).unwrap();
        let fresh = RenewalRecord { date: now - Duration::days(5), processed_by: None };

        let active = VehicleResponse::at(stored_vehicle("ABC 1", vec![fresh.clone()]), now);
        let expired = VehicleResponse::at(stored_vehicle("ABC 2", vec![]), now);
        let mut deleted = VehicleResponse::at(stored_vehicle("ABC 3", vec![fresh]), now);
        deleted.deleted_at = Some(now);

        let stats = VehicleStatsResponse::from_responses(&[active, expired, deleted]);
        assert_eq!(
            stats,
            VehicleStatsResponse { total: 3, active: 1, expired: 1, deleted: 1 }
        );
    }
}

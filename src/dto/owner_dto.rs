use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::owner::{NewOwner, Owner};
use crate::utils::validation::{empty_string_as_none, patch_field};

// Owner registration request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOwnerRequest {
    #[validate(length(min = 2, max = 200))]
    pub full_name: String,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(length(max = 500))]
    pub address: Option<String>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(length(min = 5, max = 30))]
    pub license_no: Option<String>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub birth_date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(length(max = 30))]
    pub contact_no: Option<String>,
}

impl From<CreateOwnerRequest> for NewOwner {
    fn from(request: CreateOwnerRequest) -> Self {
        Self {
            full_name: request.full_name.trim().to_string(),
            address: request.address,
            license_no: request.license_no.map(|l| l.to_uppercase()),
            birth_date: request.birth_date,
            contact_no: request.contact_no,
        }
    }
}

// Owner update request: absent = keep, "" = clear
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateOwnerRequest {
    #[validate(length(min = 2, max = 200))]
    pub full_name: Option<String>,

    #[serde(default, deserialize_with = "patch_field")]
    pub address: Option<Option<String>>,

    #[serde(default, deserialize_with = "patch_field")]
    pub license_no: Option<Option<String>>,

    #[serde(default, deserialize_with = "patch_field")]
    pub birth_date: Option<Option<NaiveDate>>,

    #[serde(default, deserialize_with = "patch_field")]
    pub contact_no: Option<Option<String>>,
}

impl UpdateOwnerRequest {
    /// Merge the patch over the current row
    pub fn apply_to(self, current: &Owner) -> NewOwner {
        NewOwner {
            full_name: self
                .full_name
                .map(|n| n.trim().to_string())
                .unwrap_or_else(|| current.full_name.clone()),
            address: self.address.unwrap_or_else(|| current.address.clone()),
            license_no: self
                .license_no
                .map(|l| l.map(|l| l.to_uppercase()))
                .unwrap_or_else(|| current.license_no.clone()),
            birth_date: self.birth_date.unwrap_or(current.birth_date),
            contact_no: self.contact_no.unwrap_or_else(|| current.contact_no.clone()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct OwnerFilters {
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OwnerResponse {
    pub id: Uuid,
    pub full_name: String,
    pub address: Option<String>,
    pub license_no: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub contact_no: Option<String>,
    pub vehicle_ids: Vec<Uuid>,
    pub vehicle_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Owner> for OwnerResponse {
    fn from(owner: Owner) -> Self {
        Self {
            id: owner.id,
            full_name: owner.full_name,
            address: owner.address,
            license_no: owner.license_no,
            birth_date: owner.birth_date,
            contact_no: owner.contact_no,
            vehicle_count: owner.vehicle_ids.len(),
            vehicle_ids: owner.vehicle_ids,
            created_at: owner.created_at,
            updated_at: owner.updated_at,
        }
    }
}

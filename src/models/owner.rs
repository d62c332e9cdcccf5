//! Owner model
//!
//! `vehicle_ids` is maintained explicitly by the ownership service; it must
//! list exactly the vehicles whose `owner_id` points back here.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Owner {
    pub id: Uuid,
    pub full_name: String,
    pub address: Option<String>,
    pub license_no: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub contact_no: Option<String>,
    pub vehicle_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOwner {
    pub full_name: String,
    pub address: Option<String>,
    pub license_no: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub contact_no: Option<String>,
}

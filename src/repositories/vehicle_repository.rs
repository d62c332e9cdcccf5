use crate::models::vehicle::{NewVehicle, StatusChange, Vehicle, VehicleChanges};
use crate::utils::errors::{not_found_error, AppError};
use chrono::Utc;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

/// Database-level filters; status is filtered after recomputation
#[derive(Debug, Default, Clone)]
pub struct VehicleQuery {
    pub owner_id: Option<Uuid>,
    pub plate: Option<String>,
    pub include_deleted: bool,
}

pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, AppError> {
        Ok(self.pool.begin().await?)
    }

    pub async fn insert(conn: &mut PgConnection, vehicle: &NewVehicle) -> Result<Vehicle, AppError> {
        let now = Utc::now();

        let created = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (
                id, plate_no, file_no, engine_no, chassis_no, make, body_type, color,
                classification, renewal_dates, status_type, vehicle_status, owner_id,
                previous_owner_id, deleted_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, NULL, NULL, $14, $14)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&vehicle.plate_no)
        .bind(&vehicle.file_no)
        .bind(&vehicle.engine_no)
        .bind(&vehicle.chassis_no)
        .bind(&vehicle.make)
        .bind(&vehicle.body_type)
        .bind(&vehicle.color)
        .bind(&vehicle.classification)
        .bind(Json(&vehicle.renewal_dates))
        .bind(vehicle.status_type)
        .bind(vehicle.vehicle_status)
        .bind(vehicle.owner_id)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;

        Ok(created)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(vehicle)
    }

    /// Load and lock a vehicle row for the rest of the transaction
    pub async fn lock_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Vehicle, AppError> {
        sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &id))
    }

    pub async fn plate_exists(&self, plate_no: &str, exclude_id: Option<Uuid>) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM vehicles WHERE plate_no = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(plate_no)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    pub async fn list(&self, query: &VehicleQuery) -> Result<Vec<Vehicle>, AppError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM vehicles WHERE 1 = 1");

        if !query.include_deleted {
            builder.push(" AND deleted_at IS NULL");
        }
        if let Some(owner_id) = query.owner_id {
            builder.push(" AND owner_id = ").push_bind(owner_id);
        }
        if let Some(plate) = &query.plate {
            builder.push(" AND plate_no ILIKE ").push_bind(format!("%{}%", plate));
        }
        builder.push(" ORDER BY created_at DESC");

        let vehicles = builder
            .build_query_as::<Vehicle>()
            .fetch_all(&self.pool)
            .await?;

        Ok(vehicles)
    }

    pub async fn update(conn: &mut PgConnection, id: Uuid, changes: &VehicleChanges) -> Result<Vehicle, AppError> {
        sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET plate_no = $2, file_no = $3, engine_no = $4, chassis_no = $5, make = $6,
                body_type = $7, color = $8, classification = $9, renewal_dates = $10,
                status_type = $11, vehicle_status = $12, updated_at = $13
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.plate_no)
        .bind(&changes.file_no)
        .bind(&changes.engine_no)
        .bind(&changes.chassis_no)
        .bind(&changes.make)
        .bind(&changes.body_type)
        .bind(&changes.color)
        .bind(&changes.classification)
        .bind(Json(&changes.renewal_dates))
        .bind(changes.status_type)
        .bind(changes.vehicle_status)
        .bind(Utc::now())
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| not_found_error("Vehicle", &id))
    }

    /// Persist recomputed statuses, returns the number of rows touched.
    /// Rows modified since they were read are left alone.
    pub async fn update_statuses(&self, changes: &[StatusChange]) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut updated = 0;

        for change in changes {
            let result = sqlx::query(
                r#"
                UPDATE vehicles SET vehicle_status = $2, updated_at = $3
                WHERE id = $1 AND vehicle_status <> $2 AND updated_at = $4
                "#,
            )
            .bind(change.vehicle_id)
            .bind(change.status)
            .bind(Utc::now())
            .bind(change.observed_at)
            .execute(&mut *tx)
            .await?;
            updated += result.rows_affected();
        }

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn set_deleted(&self, id: Uuid, deleted: bool) -> Result<Vehicle, AppError> {
        let now = Utc::now();
        let deleted_at = if deleted { Some(now) } else { None };

        sqlx::query_as::<_, Vehicle>(
            "UPDATE vehicles SET deleted_at = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(deleted_at)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found_error("Vehicle", &id))
    }

    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }
}

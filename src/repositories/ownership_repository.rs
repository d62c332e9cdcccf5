//! Postgres side of the owner ↔ vehicle relation
//!
//! Borrows the connection of an open transaction so that both sides of a
//! create/transfer/delete commit or roll back together.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::services::ownership::OwnershipStore;
use crate::utils::errors::{not_found_error, AppResult};

pub struct PgOwnershipStore<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgOwnershipStore<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl<'c> OwnershipStore for PgOwnershipStore<'c> {
    async fn owned_vehicle_ids(&mut self, owner_id: Uuid) -> AppResult<Option<Vec<Uuid>>> {
        let ids = sqlx::query_scalar::<_, Vec<Uuid>>("SELECT vehicle_ids FROM owners WHERE id = $1 FOR UPDATE")
            .bind(owner_id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(ids)
    }

    async fn attach_vehicle(&mut self, owner_id: Uuid, vehicle_id: Uuid) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE owners
            SET vehicle_ids = array_append(vehicle_ids, $2), updated_at = $3
            WHERE id = $1 AND NOT ($2 = ANY(vehicle_ids))
            "#,
        )
        .bind(owner_id)
        .bind(vehicle_id)
        .bind(Utc::now())
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    async fn detach_vehicle(&mut self, owner_id: Uuid, vehicle_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE owners SET vehicle_ids = array_remove(vehicle_ids, $2), updated_at = $3 WHERE id = $1",
        )
        .bind(owner_id)
        .bind(vehicle_id)
        .bind(Utc::now())
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    async fn set_vehicle_owner(
        &mut self,
        vehicle_id: Uuid,
        owner_id: Uuid,
        previous_owner_id: Option<Uuid>,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE vehicles SET owner_id = $2, previous_owner_id = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(vehicle_id)
        .bind(owner_id)
        .bind(previous_owner_id)
        .bind(Utc::now())
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("Vehicle", &vehicle_id));
        }

        Ok(())
    }
}

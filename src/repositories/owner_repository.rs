use crate::models::owner::{NewOwner, Owner};
use crate::utils::errors::{not_found_error, AppError};
use chrono::Utc;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

pub struct OwnerRepository {
    pool: PgPool,
}

impl OwnerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, AppError> {
        Ok(self.pool.begin().await?)
    }

    pub async fn create(&self, owner: &NewOwner) -> Result<Owner, AppError> {
        let now = Utc::now();

        let created = sqlx::query_as::<_, Owner>(
            r#"
            INSERT INTO owners (id, full_name, address, license_no, birth_date, contact_no, vehicle_ids, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, '{}', $7, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&owner.full_name)
        .bind(&owner.address)
        .bind(&owner.license_no)
        .bind(owner.birth_date)
        .bind(&owner.contact_no)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Owner>, AppError> {
        let owner = sqlx::query_as::<_, Owner>("SELECT * FROM owners WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(owner)
    }

    pub async fn license_exists(&self, license_no: &str, exclude_id: Option<Uuid>) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM owners WHERE license_no = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(license_no)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    pub async fn list(&self, search: Option<&str>, limit: i64, offset: i64) -> Result<Vec<Owner>, AppError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM owners");

        if let Some(search) = search {
            let pattern = format!("%{}%", search);
            builder
                .push(" WHERE full_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR license_no ILIKE ")
                .push_bind(pattern);
        }
        builder
            .push(" ORDER BY full_name ASC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let owners = builder.build_query_as::<Owner>().fetch_all(&self.pool).await?;

        Ok(owners)
    }

    pub async fn update(&self, id: Uuid, owner: &NewOwner) -> Result<Owner, AppError> {
        sqlx::query_as::<_, Owner>(
            r#"
            UPDATE owners
            SET full_name = $2, address = $3, license_no = $4, birth_date = $5, contact_no = $6, updated_at = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&owner.full_name)
        .bind(&owner.address)
        .bind(&owner.license_no)
        .bind(owner.birth_date)
        .bind(&owner.contact_no)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found_error("Owner", &id))
    }

    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM owners WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }
}

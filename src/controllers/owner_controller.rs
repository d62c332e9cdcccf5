use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::record_outcome;
use crate::dto::owner_dto::{CreateOwnerRequest, OwnerFilters, OwnerResponse, UpdateOwnerRequest};
use crate::dto::vehicle_dto::VehicleResponse;
use crate::dto::ApiResponse;
use crate::middleware::auth::RequestActor;
use crate::models::owner::{NewOwner, Owner};
use crate::models::user_log::LogAction;
use crate::repositories::owner_repository::OwnerRepository;
use crate::repositories::ownership_repository::PgOwnershipStore;
use crate::repositories::vehicle_repository::{VehicleQuery, VehicleRepository};
use crate::services::actor_resolver::ActorResolver;
use crate::services::audit::AuditLog;
use crate::services::ownership::OwnershipMaintainer;
use crate::state::AppState;
use crate::utils::errors::{conflict_error, not_found_error, AppError, AppResult};

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 500;

pub struct OwnerController {
    repository: OwnerRepository,
    vehicles: VehicleRepository,
    actors: Arc<dyn ActorResolver>,
    audit: Arc<dyn AuditLog>,
}

impl OwnerController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: OwnerRepository::new(state.pool.clone()),
            vehicles: VehicleRepository::new(state.pool.clone()),
            actors: state.actors.clone(),
            audit: state.audit.clone(),
        }
    }

    pub async fn create(
        &self,
        caller: &RequestActor,
        request: CreateOwnerRequest,
    ) -> Result<ApiResponse<OwnerResponse>, AppError> {
        request.validate()?;
        let actor = self.actors.resolve(caller.user_id).await?;

        let result = self.insert_owner(NewOwner::from(request)).await;
        record_outcome(self.audit.as_ref(), caller, actor, LogAction::AddOwner, &result, |o| {
            format!("Added owner {} ({})", o.full_name, o.id)
        })
        .await;

        let owner = result?;
        info!("✅ Owner {} registered", owner.full_name);
        Ok(ApiResponse::success_with_message(
            OwnerResponse::from(owner),
            "Owner created successfully",
        ))
    }

    async fn insert_owner(&self, owner: NewOwner) -> AppResult<Owner> {
        if let Some(license_no) = &owner.license_no {
            if self.repository.license_exists(license_no, None).await? {
                return Err(conflict_error("Owner", "license_no", license_no));
            }
        }
        self.repository.create(&owner).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<OwnerResponse, AppError> {
        Ok(OwnerResponse::from(self.find(id).await?))
    }

    async fn find(&self, id: Uuid) -> AppResult<Owner> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Owner", &id))
    }

    pub async fn list(&self, filters: OwnerFilters) -> Result<Vec<OwnerResponse>, AppError> {
        let search = filters.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let limit = filters.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = filters.offset.unwrap_or(0).max(0);

        let owners = self.repository.list(search, limit, offset).await?;
        Ok(owners.into_iter().map(OwnerResponse::from).collect())
    }

    pub async fn update(
        &self,
        caller: &RequestActor,
        id: Uuid,
        request: UpdateOwnerRequest,
    ) -> Result<ApiResponse<OwnerResponse>, AppError> {
        request.validate()?;
        let actor = self.actors.resolve(caller.user_id).await?;

        let result = self.apply_update(id, request).await;
        record_outcome(self.audit.as_ref(), caller, actor, LogAction::UpdateOwner, &result, |o| {
            format!("Updated owner {} ({})", o.full_name, o.id)
        })
        .await;

        Ok(ApiResponse::success_with_message(
            OwnerResponse::from(result?),
            "Owner updated successfully",
        ))
    }

    async fn apply_update(&self, id: Uuid, request: UpdateOwnerRequest) -> AppResult<Owner> {
        let current = self.find(id).await?;
        let owner = request.apply_to(&current);

        if let Some(license_no) = &owner.license_no {
            if self.repository.license_exists(license_no, Some(id)).await? {
                return Err(conflict_error("Owner", "license_no", license_no));
            }
        }
        self.repository.update(id, &owner).await
    }

    pub async fn delete(&self, caller: &RequestActor, id: Uuid) -> Result<ApiResponse<()>, AppError> {
        let actor = self.actors.resolve(caller.user_id).await?;

        let result = self.remove_owner(id).await;
        record_outcome(self.audit.as_ref(), caller, actor, LogAction::DeleteOwner, &result, |_| {
            format!("Deleted owner {}", id)
        })
        .await;

        result?;
        info!("🗑️ Owner {} deleted", id);
        Ok(ApiResponse::message("Owner deleted successfully"))
    }

    async fn remove_owner(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.repository.begin().await?;
        {
            let mut store = PgOwnershipStore::new(&mut *tx);
            OwnershipMaintainer::new(&mut store).ensure_owner_deletable(id).await?;
        }
        OwnerRepository::delete(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn vehicles_of_owner(&self, id: Uuid) -> Result<Vec<VehicleResponse>, AppError> {
        self.find(id).await?;

        let query = VehicleQuery {
            owner_id: Some(id),
            ..VehicleQuery::default()
        };
        let now = Utc::now();
        let vehicles = self.vehicles.list(&query).await?;

        Ok(vehicles.into_iter().map(|v| VehicleResponse::at(v, now)).collect())
    }
}

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::vehicle_dto::{
    CreateVehicleRequest, RenewVehicleRequest, TransferVehicleRequest, UpdateVehicleRequest,
    VehicleFilters, VehicleResponse, VehicleStatsResponse,
};
use super::record_outcome;
use crate::dto::ApiResponse;
use crate::middleware::auth::RequestActor;
use crate::models::user_log::LogAction;
use crate::models::vehicle::{NewVehicle, Vehicle, VehicleChanges};
use crate::repositories::ownership_repository::PgOwnershipStore;
use crate::repositories::vehicle_repository::{VehicleQuery, VehicleRepository};
use crate::services::actor_resolver::ActorResolver;
use crate::services::audit::AuditLog;
use crate::services::ownership::OwnershipMaintainer;
use crate::services::renewal_history::{accumulate_renewals, initial_renewals};
use crate::services::status_sweeper::{run_sweep, SweepReport};
use crate::services::vehicle_status::status_for_history;
use crate::state::AppState;
use crate::utils::errors::{conflict_error, not_found_error, AppError, AppResult};
use crate::utils::validation::normalize_plate;

const DEFAULT_PAGE_SIZE: usize = 100;
const MAX_PAGE_SIZE: usize = 500;

fn page_size(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

pub struct VehicleController {
    pool: PgPool,
    repository: VehicleRepository,
    actors: Arc<dyn ActorResolver>,
    audit: Arc<dyn AuditLog>,
}

impl VehicleController {
    pub fn new(state: &AppState) -> Self {
        Self {
            pool: state.pool.clone(),
            repository: VehicleRepository::new(state.pool.clone()),
            actors: state.actors.clone(),
            audit: state.audit.clone(),
        }
    }

    pub async fn create(
        &self,
        caller: &RequestActor,
        request: CreateVehicleRequest,
    ) -> Result<ApiResponse<VehicleResponse>, AppError> {
        request.validate()?;
        let actor = self.actors.resolve(caller.user_id).await?;

        let result = self.insert_vehicle(actor, request).await;
        self.record(caller, actor, LogAction::AddVehicle, &result, |v| {
            format!("Added vehicle {} ({}) for owner {}", v.plate_no, v.id, v.owner_id)
        })
        .await;

        let vehicle = result?;
        info!("✅ Vehicle {} registered", vehicle.plate_no);
        Ok(ApiResponse::success_with_message(
            VehicleResponse::at(vehicle, Utc::now()),
            "Vehicle created successfully",
        ))
    }

    async fn insert_vehicle(&self, actor: Option<Uuid>, request: CreateVehicleRequest) -> AppResult<Vehicle> {
        let plate_no = normalize_plate(&request.plate_no);
        if self.repository.plate_exists(&plate_no, None).await? {
            return Err(conflict_error("Vehicle", "plate_no", &plate_no));
        }

        let status_type = request.status_type();
        let renewal_dates = initial_renewals(request.renewal_dates.as_ref(), actor)?;
        let vehicle_status = status_for_history(&plate_no, &renewal_dates, status_type, Utc::now());

        let new_vehicle = NewVehicle {
            plate_no,
            file_no: request.file_no,
            engine_no: request.engine_no,
            chassis_no: request.chassis_no,
            make: request.make,
            body_type: request.body_type,
            color: request.color,
            classification: request.classification,
            renewal_dates,
            status_type,
            vehicle_status,
            owner_id: request.owner_id,
        };

        let mut tx = self.repository.begin().await?;
        let vehicle = VehicleRepository::insert(&mut *tx, &new_vehicle).await?;
        {
            let mut store = PgOwnershipStore::new(&mut *tx);
            OwnershipMaintainer::new(&mut store)
                .on_vehicle_created(vehicle.id, vehicle.owner_id)
                .await?;
        }
        tx.commit().await?;

        Ok(vehicle)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<VehicleResponse, AppError> {
        let vehicle = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &id))?;

        Ok(VehicleResponse::at(vehicle, Utc::now()))
    }

    pub async fn list(&self, filters: VehicleFilters) -> Result<Vec<VehicleResponse>, AppError> {
        let query = VehicleQuery {
            owner_id: filters.owner_id,
            plate: filters.plate.filter(|p| !p.trim().is_empty()),
            include_deleted: filters.include_deleted.unwrap_or(false),
        };

        let now = Utc::now();
        let vehicles = self
            .repository
            .list(&query)
            .await?
            .into_iter()
            .map(|v| VehicleResponse::at(v, now))
            .filter(|v| filters.status.map_or(true, |status| v.vehicle_status == status))
            .skip(filters.offset.unwrap_or(0))
            .take(page_size(filters.limit))
            .collect();

        Ok(vehicles)
    }

    pub async fn stats(&self) -> Result<VehicleStatsResponse, AppError> {
        let query = VehicleQuery {
            include_deleted: true,
            ..VehicleQuery::default()
        };

        let now = Utc::now();
        let responses: Vec<VehicleResponse> = self
            .repository
            .list(&query)
            .await?
            .into_iter()
            .map(|v| VehicleResponse::at(v, now))
            .collect();

        Ok(VehicleStatsResponse::from_responses(&responses))
    }

    pub async fn update(
        &self,
        caller: &RequestActor,
        id: Uuid,
        request: UpdateVehicleRequest,
    ) -> Result<ApiResponse<VehicleResponse>, AppError> {
        request.validate()?;
        let actor = self.actors.resolve(caller.user_id).await?;

        let result = self.apply_update(actor, id, request).await;
        self.record(caller, actor, LogAction::UpdateVehicle, &result, |v| {
            format!("Updated vehicle {} ({})", v.plate_no, v.id)
        })
        .await;

        Ok(ApiResponse::success_with_message(
            VehicleResponse::at(result?, Utc::now()),
            "Vehicle updated successfully",
        ))
    }

    async fn apply_update(&self, actor: Option<Uuid>, id: Uuid, request: UpdateVehicleRequest) -> AppResult<Vehicle> {
        let plate_no = request.plate_no.as_deref().map(normalize_plate);
        if let Some(plate_no) = &plate_no {
            if self.repository.plate_exists(plate_no, Some(id)).await? {
                return Err(conflict_error("Vehicle", "plate_no", plate_no));
            }
        }

        let mut tx = self.repository.begin().await?;
        let current = VehicleRepository::lock_by_id(&mut *tx, id).await?;
        ensure_not_deleted(&current)?;

        let mut changes = VehicleChanges::from(&current);
        if let Some(plate_no) = plate_no {
            changes.plate_no = plate_no;
        }
        if let Some(file_no) = request.file_no {
            changes.file_no = file_no;
        }
        if let Some(engine_no) = request.engine_no {
            changes.engine_no = engine_no;
        }
        if let Some(chassis_no) = request.chassis_no {
            changes.chassis_no = chassis_no;
        }
        if let Some(make) = request.make {
            changes.make = make;
        }
        if let Some(body_type) = request.body_type {
            changes.body_type = body_type;
        }
        if let Some(color) = request.color {
            changes.color = color;
        }
        if let Some(classification) = request.classification {
            changes.classification = classification;
        }
        if let Some(status_type) = request.status_type {
            changes.status_type = status_type;
        }
        if let Some(input) = &request.renewal_dates {
            changes.renewal_dates = accumulate_renewals(current.renewals(), input, actor)?;
        }
        changes.vehicle_status =
            status_for_history(&changes.plate_no, &changes.renewal_dates, changes.status_type, Utc::now());

        let mut vehicle = VehicleRepository::update(&mut *tx, id, &changes).await?;

        if let Some(new_owner) = request.owner_id.filter(|owner| *owner != current.owner_id) {
            {
                let mut store = PgOwnershipStore::new(&mut *tx);
                OwnershipMaintainer::new(&mut store)
                    .transfer(id, Some(current.owner_id), new_owner)
                    .await?;
            }
            vehicle = VehicleRepository::lock_by_id(&mut *tx, id).await?;
        }

        tx.commit().await?;
        Ok(vehicle)
    }

    pub async fn renew(
        &self,
        caller: &RequestActor,
        id: Uuid,
        request: RenewVehicleRequest,
    ) -> Result<ApiResponse<VehicleResponse>, AppError> {
        let actor = self.actors.resolve(caller.user_id).await?;

        let result = self.append_renewals(actor, id, request).await;
        self.record(caller, actor, LogAction::RenewVehicle, &result, |v| {
            format!(
                "Renewed vehicle {} ({}), {} renewals on record",
                v.plate_no,
                v.id,
                v.renewals().len()
            )
        })
        .await;

        Ok(ApiResponse::success_with_message(
            VehicleResponse::at(result?, Utc::now()),
            "Vehicle renewed successfully",
        ))
    }

    async fn append_renewals(&self, actor: Option<Uuid>, id: Uuid, request: RenewVehicleRequest) -> AppResult<Vehicle> {
        let mut tx = self.repository.begin().await?;
        let current = VehicleRepository::lock_by_id(&mut *tx, id).await?;
        ensure_not_deleted(&current)?;

        let mut changes = VehicleChanges::from(&current);
        changes.renewal_dates = accumulate_renewals(current.renewals(), &request.renewal_dates, actor)?;
        changes.vehicle_status =
            status_for_history(&changes.plate_no, &changes.renewal_dates, changes.status_type, Utc::now());

        let vehicle = VehicleRepository::update(&mut *tx, id, &changes).await?;
        tx.commit().await?;
        Ok(vehicle)
    }

    pub async fn transfer(
        &self,
        caller: &RequestActor,
        id: Uuid,
        request: TransferVehicleRequest,
    ) -> Result<ApiResponse<VehicleResponse>, AppError> {
        let actor = self.actors.resolve(caller.user_id).await?;

        let result = self.move_vehicle(id, request.new_owner_id).await;
        self.record(caller, actor, LogAction::TransferVehicle, &result, |v| {
            format!(
                "Transferred vehicle {} ({}) from {:?} to {}",
                v.plate_no, v.id, v.previous_owner_id, v.owner_id
            )
        })
        .await;

        Ok(ApiResponse::success_with_message(
            VehicleResponse::at(result?, Utc::now()),
            "Vehicle transferred successfully",
        ))
    }

    async fn move_vehicle(&self, id: Uuid, new_owner: Uuid) -> AppResult<Vehicle> {
        let mut tx = self.repository.begin().await?;
        let current = VehicleRepository::lock_by_id(&mut *tx, id).await?;
        ensure_not_deleted(&current)?;

        {
            let mut store = PgOwnershipStore::new(&mut *tx);
            OwnershipMaintainer::new(&mut store)
                .transfer(id, Some(current.owner_id), new_owner)
                .await?;
        }

        let vehicle = VehicleRepository::lock_by_id(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(vehicle)
    }

    pub async fn delete(
        &self,
        caller: &RequestActor,
        id: Uuid,
        permanent: bool,
    ) -> Result<ApiResponse<()>, AppError> {
        let actor = self.actors.resolve(caller.user_id).await?;

        let result = if permanent {
            self.purge(id).await
        } else {
            self.repository.set_deleted(id, true).await
        };
        self.record(caller, actor, LogAction::DeleteVehicle, &result, |v| {
            let kind = if permanent { "Permanently deleted" } else { "Deleted" };
            format!("{} vehicle {} ({})", kind, v.plate_no, v.id)
        })
        .await;

        let vehicle = result?;
        info!("🗑️ Vehicle {} deleted (permanent: {})", vehicle.plate_no, permanent);
        Ok(ApiResponse::message("Vehicle deleted successfully"))
    }

    async fn purge(&self, id: Uuid) -> AppResult<Vehicle> {
        let mut tx = self.repository.begin().await?;
        let vehicle = VehicleRepository::lock_by_id(&mut *tx, id).await?;
        {
            let mut store = PgOwnershipStore::new(&mut *tx);
            OwnershipMaintainer::new(&mut store)
                .on_vehicle_removed(vehicle.id, vehicle.owner_id)
                .await?;
        }
        VehicleRepository::delete(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(vehicle)
    }

    pub async fn restore(
        &self,
        caller: &RequestActor,
        id: Uuid,
    ) -> Result<ApiResponse<VehicleResponse>, AppError> {
        let actor = self.actors.resolve(caller.user_id).await?;

        let result = self.repository.set_deleted(id, false).await;
        self.record(caller, actor, LogAction::RestoreVehicle, &result, |v| {
            format!("Restored vehicle {} ({})", v.plate_no, v.id)
        })
        .await;

        Ok(ApiResponse::success_with_message(
            VehicleResponse::at(result?, Utc::now()),
            "Vehicle restored successfully",
        ))
    }

    pub async fn sweep(&self, caller: &RequestActor) -> Result<ApiResponse<SweepReport>, AppError> {
        let actor = self.actors.resolve(caller.user_id).await?;

        let result = run_sweep(&self.pool, Utc::now()).await;
        self.record(caller, actor, LogAction::StatusSweep, &result, |r| {
            format!("Status sweep updated {} of {} vehicles", r.updated, r.scanned)
        })
        .await;

        Ok(ApiResponse::success_with_message(result?, "Status sweep completed"))
    }

    async fn record<T>(
        &self,
        caller: &RequestActor,
        actor: Option<Uuid>,
        action: LogAction,
        result: &AppResult<T>,
        describe: impl FnOnce(&T) -> String,
    ) {
        record_outcome(self.audit.as_ref(), caller, actor, action, result, describe).await;
    }
}

fn ensure_not_deleted(vehicle: &Vehicle) -> AppResult<()> {
    if vehicle.is_deleted() {
        return Err(AppError::BadRequest(format!(
            "Vehicle {} is deleted, restore it first",
            vehicle.id
        )));
    }
    Ok(())
}

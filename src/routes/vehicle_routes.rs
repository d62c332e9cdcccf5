use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::vehicle_dto::{
    CreateVehicleRequest, DeleteVehicleQuery, RenewVehicleRequest, TransferVehicleRequest,
    UpdateVehicleRequest, VehicleFilters, VehicleResponse, VehicleStatsResponse,
};
use crate::dto::ApiResponse;
use crate::middleware::auth::RequestActor;
use crate::services::status_sweeper::SweepReport;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_vehicle).get(list_vehicles))
        .route("/stats", get(vehicle_stats))
        .route("/sweep", post(sweep_statuses))
        .route("/:id", get(get_vehicle).put(update_vehicle).delete(delete_vehicle))
        .route("/:id/renew", post(renew_vehicle))
        .route("/:id/transfer", post(transfer_vehicle))
        .route("/:id/restore", post(restore_vehicle))
}

async fn create_vehicle(
    State(state): State<AppState>,
    caller: RequestActor,
    Json(request): Json<CreateVehicleRequest>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let controller = VehicleController::new(&state);
    let response = controller.create(&caller, request).await?;
    Ok(Json(response))
}

async fn list_vehicles(
    State(state): State<AppState>,
    Query(filters): Query<VehicleFilters>,
) -> Result<Json<ApiResponse<Vec<VehicleResponse>>>, AppError> {
    let controller = VehicleController::new(&state);
    let vehicles = controller.list(filters).await?;
    Ok(Json(ApiResponse::success(vehicles)))
}

async fn vehicle_stats(State(state): State<AppState>) -> Result<Json<ApiResponse<VehicleStatsResponse>>, AppError> {
    let controller = VehicleController::new(&state);
    let stats = controller.stats().await?;
    Ok(Json(ApiResponse::success(stats)))
}

async fn sweep_statuses(
    State(state): State<AppState>,
    caller: RequestActor,
) -> Result<Json<ApiResponse<SweepReport>>, AppError> {
    let controller = VehicleController::new(&state);
    let response = controller.sweep(&caller).await?;
    Ok(Json(response))
}

async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let controller = VehicleController::new(&state);
    let vehicle = controller.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(vehicle)))
}

async fn update_vehicle(
    State(state): State<AppState>,
    caller: RequestActor,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateVehicleRequest>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let controller = VehicleController::new(&state);
    let response = controller.update(&caller, id, request).await?;
    Ok(Json(response))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    caller: RequestActor,
    Path(id): Path<Uuid>,
    Query(query): Query<DeleteVehicleQuery>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = VehicleController::new(&state);
    let response = controller.delete(&caller, id, query.permanent).await?;
    Ok(Json(response))
}

async fn renew_vehicle(
    State(state): State<AppState>,
    caller: RequestActor,
    Path(id): Path<Uuid>,
    Json(request): Json<RenewVehicleRequest>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let controller = VehicleController::new(&state);
    let response = controller.renew(&caller, id, request).await?;
    Ok(Json(response))
}

async fn transfer_vehicle(
    State(state): State<AppState>,
    caller: RequestActor,
    Path(id): Path<Uuid>,
    Json(request): Json<TransferVehicleRequest>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let controller = VehicleController::new(&state);
    let response = controller.transfer(&caller, id, request).await?;
    Ok(Json(response))
}

async fn restore_vehicle(
    State(state): State<AppState>,
    caller: RequestActor,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let controller = VehicleController::new(&state);
    let response = controller.restore(&caller, id).await?;
    Ok(Json(response))
}

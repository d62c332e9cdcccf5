use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::owner_controller::OwnerController;
use crate::dto::owner_dto::{CreateOwnerRequest, OwnerFilters, OwnerResponse, UpdateOwnerRequest};
use crate::dto::vehicle_dto::VehicleResponse;
use crate::dto::ApiResponse;
use crate::middleware::auth::RequestActor;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_owner_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_owners).post(create_owner))
        .route("/:id", get(get_owner).put(update_owner).delete(delete_owner))
        .route("/:id/vehicles", get(owner_vehicles))
}

async fn create_owner(
    State(state): State<AppState>,
    caller: RequestActor,
    Json(request): Json<CreateOwnerRequest>,
) -> Result<Json<ApiResponse<OwnerResponse>>, AppError> {
    let controller = OwnerController::new(&state);
    let response = controller.create(&caller, request).await?;
    Ok(Json(response))
}

async fn list_owners(
    State(state): State<AppState>,
    Query(filters): Query<OwnerFilters>,
) -> Result<Json<ApiResponse<Vec<OwnerResponse>>>, AppError> {
    let controller = OwnerController::new(&state);
    let owners = controller.list(filters).await?;
    Ok(Json(ApiResponse::success(owners)))
}

async fn get_owner(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OwnerResponse>>, AppError> {
    let controller = OwnerController::new(&state);
    let owner = controller.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(owner)))
}

async fn update_owner(
    State(state): State<AppState>,
    caller: RequestActor,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOwnerRequest>,
) -> Result<Json<ApiResponse<OwnerResponse>>, AppError> {
    let controller = OwnerController::new(&state);
    let response = controller.update(&caller, id, request).await?;
    Ok(Json(response))
}

async fn delete_owner(
    State(state): State<AppState>,
    caller: RequestActor,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = OwnerController::new(&state);
    let response = controller.delete(&caller, id).await?;
    Ok(Json(response))
}

async fn owner_vehicles(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<VehicleResponse>>>, AppError> {
    let controller = OwnerController::new(&state);
    let vehicles = controller.vehicles_of_owner(id).await?;
    Ok(Json(ApiResponse::success(vehicles)))
}

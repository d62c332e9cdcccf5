//! Flows that need a live Postgres. `#[sqlx::test]` creates a fresh database
//! per test from `DATABASE_URL` and applies `./migrations`.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use lto_records::config::EnvironmentConfig;
use lto_records::create_app;
use lto_records::models::owner::NewOwner;
use lto_records::models::vehicle::{NewVehicle, StatusChange, StatusType, VehicleStatus};
use lto_records::repositories::owner_repository::OwnerRepository;
use lto_records::repositories::vehicle_repository::{VehicleQuery, VehicleRepository};
use lto_records::services::actor_resolver::StaticActorResolver;
use lto_records::services::audit::MemoryAuditLog;
use lto_records::state::AppState;
use lto_records::utils::errors::AppError;
use lto_records::utils::jwt::JwtClaims;

const TEST_SECRET: &str = "test-secret";

fn create_test_app(pool: PgPool) -> Router {
    let config = EnvironmentConfig {
        jwt_secret: TEST_SECRET.to_string(),
        ..EnvironmentConfig::default()
    };

    let state = AppState::with_collaborators(
        pool,
        config,
        Arc::new(StaticActorResolver { fallback: None }),
        Arc::new(MemoryAuditLog::default()),
    );

    create_app(state)
}

fn token_for(user_id: Uuid) -> String {
    let now = Utc::now().timestamp();
    let claims = JwtClaims {
        sub: user_id.to_string(),
        role: Some("employee".to_string()),
        exp: (now + 3600) as usize,
        iat: now as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(TEST_SECRET.as_ref())).expect("token")
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>, bearer: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = body.map_or_else(Body::empty, |b| Body::from(b.to_string()));

    let response = app.clone().oneshot(builder.body(body).expect("request")).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json")
    };
    (status, json)
}

async fn create_owner(app: &Router, name: &str) -> Uuid {
    let (status, body) = send(app, Method::POST, "/api/owners", Some(json!({ "full_name": name })), None).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    serde_json::from_value(body["data"]["id"].clone()).expect("owner id")
}

async fn create_vehicle(app: &Router, plate: &str, owner_id: Uuid, renewal: &str, bearer: Option<&str>) -> Value {
    let request = json!({
        "plate_no": plate,
        "make": "Toyota",
        "renewal_dates": renewal,
        "owner_id": owner_id,
    });
    let (status, body) = send(app, Method::POST, "/api/vehicles", Some(request), bearer).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    body["data"].clone()
}

async fn vehicle_ids_of(app: &Router, owner_id: Uuid) -> Vec<Uuid> {
    let (status, body) = send(app, Method::GET, &format!("/api/owners/{}", owner_id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_value(body["data"]["vehicle_ids"].clone()).expect("vehicle ids")
}

fn days_ago(days: i64) -> String {
    (Utc::now() - Duration::days(days)).format("%Y-%m-%d").to_string()
}

fn new_vehicle(plate: &str, owner_id: Uuid) -> NewVehicle {
    NewVehicle {
        plate_no: plate.to_string(),
        file_no: None,
        engine_no: None,
        chassis_no: None,
        make: None,
        body_type: None,
        color: None,
        classification: None,
        renewal_dates: Vec::new(),
        status_type: StatusType::Old,
        vehicle_status: VehicleStatus::Expired,
        owner_id,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_vehicle_links_owner(pool: PgPool) {
    let app = create_test_app(pool);
    let owner = create_owner(&app, "Juan Dela Cruz").await;

    let vehicle = create_vehicle(&app, "abc 1234", owner, &days_ago(10), None).await;
    let vehicle_id: Uuid = serde_json::from_value(vehicle["id"].clone()).unwrap();

    assert_eq!(vehicle["plate_no"], "ABC 1234");
    assert_eq!(vehicle["vehicle_status"], "active");
    assert_eq!(vehicle_ids_of(&app, owner).await, vec![vehicle_id]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_vehicle_for_missing_owner_rolls_back(pool: PgPool) {
    let app = create_test_app(pool.clone());
    let request = json!({ "plate_no": "NOO 1", "owner_id": Uuid::new_v4() });

    let (status, _) = send(&app, Method::POST, "/api/vehicles", Some(request), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let vehicles = VehicleRepository::new(pool).list(&VehicleQuery::default()).await.unwrap();
    assert!(vehicles.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_transfer_moves_vehicle_and_repeat_is_idempotent(pool: PgPool) {
    let app = create_test_app(pool);
    let seller = create_owner(&app, "Maria Santos").await;
    let buyer = create_owner(&app, "Jose Rizal").await;
    let vehicle = create_vehicle(&app, "XYZ 789", seller, &days_ago(30), None).await;
    let vehicle_id: Uuid = serde_json::from_value(vehicle["id"].clone()).unwrap();
    let uri = format!("/api/vehicles/{}/transfer", vehicle_id);

    let (status, body) = send(&app, Method::POST, &uri, Some(json!({ "new_owner_id": buyer })), None).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["owner_id"], json!(buyer));
    assert_eq!(body["data"]["previous_owner_id"], json!(seller));

    let (status, body) = send(&app, Method::POST, &uri, Some(json!({ "new_owner_id": buyer })), None).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["owner_id"], json!(buyer));

    assert!(vehicle_ids_of(&app, seller).await.is_empty());
    assert_eq!(vehicle_ids_of(&app, buyer).await, vec![vehicle_id]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_transfer_to_missing_owner_keeps_links(pool: PgPool) {
    let app = create_test_app(pool);
    let owner = create_owner(&app, "Andres Bonifacio").await;
    let vehicle = create_vehicle(&app, "LMN 456", owner, &days_ago(30), None).await;
    let vehicle_id: Uuid = serde_json::from_value(vehicle["id"].clone()).unwrap();

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/vehicles/{}/transfer", vehicle_id),
        Some(json!({ "new_owner_id": Uuid::new_v4() })),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(vehicle_ids_of(&app, owner).await, vec![vehicle_id]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_owner_with_vehicles_cannot_be_deleted(pool: PgPool) {
    let app = create_test_app(pool);
    let owner = create_owner(&app, "Gabriela Silang").await;
    let vehicle = create_vehicle(&app, "GAB 101", owner, &days_ago(5), None).await;
    let owner_uri = format!("/api/owners/{}", owner);

    let (status, body) = send(&app, Method::DELETE, &owner_uri, None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "OWNER_HAS_VEHICLES");

    // soft delete keeps the link
    let vehicle_uri = format!("/api/vehicles/{}", vehicle["id"].as_str().unwrap());
    let (status, _) = send(&app, Method::DELETE, &vehicle_uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::DELETE, &owner_uri, None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::DELETE, &format!("{}?permanent=true", vehicle_uri), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::DELETE, &owner_uri, None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::GET, &owner_uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_renewal_keeps_original_processed_by(pool: PgPool) {
    let app = create_test_app(pool);
    let clerk = Uuid::new_v4();
    let cashier = Uuid::new_v4();
    let owner = create_owner(&app, "Apolinario Mabini").await;

    let first_day = days_ago(400);
    let vehicle = create_vehicle(&app, "1234567", owner, &first_day, Some(&token_for(clerk))).await;
    assert_eq!(vehicle["vehicle_status"], "expired");
    assert_eq!(vehicle["renewal_dates"][0]["processed_by"], json!(clerk));

    let second_day = days_ago(3);
    let request = json!({
        "renewal_dates": [
            { "date": first_day, "processed_by": "not-a-uuid" },
            { "date": second_day, "processed_by": Uuid::new_v4() },
        ]
    });
    let uri = format!("/api/vehicles/{}/renew", vehicle["id"].as_str().unwrap());
    let (status, body) = send(&app, Method::POST, &uri, Some(request), Some(&token_for(cashier))).await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let history = body["data"]["renewal_dates"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["processed_by"], json!(clerk));
    assert_eq!(history[1]["processed_by"], json!(cashier));
    assert_eq!(body["data"]["vehicle_status"], "active");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_stale_sweep_plan_does_not_overwrite_renewal(pool: PgPool) {
    let app = create_test_app(pool.clone());
    let repository = VehicleRepository::new(pool);
    let owner = create_owner(&app, "Emilio Jacinto").await;
    let vehicle = create_vehicle(&app, "OLD 2015", owner, "2015-01-01", None).await;
    let vehicle_id: Uuid = serde_json::from_value(vehicle["id"].clone()).unwrap();

    let snapshot = repository.find_by_id(vehicle_id).await.unwrap().unwrap();
    assert_eq!(snapshot.vehicle_status, VehicleStatus::Expired);

    let uri = format!("/api/vehicles/{}/renew", vehicle_id);
    let (status, _) = send(&app, Method::POST, &uri, Some(json!({ "renewal_dates": days_ago(1) })), None).await;
    assert_eq!(status, StatusCode::OK);

    let stale = StatusChange {
        vehicle_id,
        status: VehicleStatus::Expired,
        observed_at: snapshot.updated_at,
    };
    assert_eq!(repository.update_statuses(&[stale]).await.unwrap(), 0);

    let current = repository.find_by_id(vehicle_id).await.unwrap().unwrap();
    assert_eq!(current.vehicle_status, VehicleStatus::Active);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_plate_and_licence_are_conflicts(pool: PgPool) {
    let owners = OwnerRepository::new(pool.clone());
    let licensed = NewOwner {
        full_name: "Melchora Aquino".to_string(),
        address: None,
        license_no: Some("N01-12-345678".to_string()),
        birth_date: None,
        contact_no: None,
    };
    let owner = owners.create(&licensed).await.unwrap();

    let duplicate = owners.create(&licensed).await.unwrap_err();
    assert!(matches!(&duplicate, AppError::Conflict(msg) if msg.contains("license_no")), "{:?}", duplicate);

    let mut conn = pool.acquire().await.unwrap();
    VehicleRepository::insert(&mut *conn, &new_vehicle("DUP 001", owner.id)).await.unwrap();
    let duplicate = VehicleRepository::insert(&mut *conn, &new_vehicle("DUP 001", owner.id))
        .await
        .unwrap_err();
    assert!(matches!(&duplicate, AppError::Conflict(msg) if msg.contains("plate_no")), "{:?}", duplicate);
}

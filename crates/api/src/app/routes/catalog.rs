//! Driver and vehicle CRUD.

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};

use depot_core::{DriverId, VehicleId};
use depot_dispatch::{DriverDraft, VehicleDraft};

use crate::app::{Engine, dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/drivers", get(list_drivers).post(create_driver))
        .route("/drivers/:id", put(update_driver).delete(delete_driver))
        .route("/vehicles", get(list_vehicles).post(create_vehicle))
        .route("/vehicles/:id", put(update_vehicle).delete(delete_vehicle))
}

pub async fn list_drivers(
    Extension(engine): Extension<Engine>,
    Query(query): Query<dto::CatalogQuery>,
) -> axum::response::Response {
    Json(engine.list_drivers(query.active_only)).into_response()
}

pub async fn create_driver(
    Extension(engine): Extension<Engine>,
    Json(body): Json<DriverDraft>,
) -> axum::response::Response {
    match engine.create_driver(&body) {
        Ok(driver) => (StatusCode::CREATED, Json(driver)).into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

pub async fn update_driver(
    Extension(engine): Extension<Engine>,
    Path(id): Path<String>,
    Json(body): Json<DriverDraft>,
) -> axum::response::Response {
    let id: DriverId = match errors::parse(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::ok_json(engine.update_driver(&id, &body))
}

pub async fn delete_driver(
    Extension(engine): Extension<Engine>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: DriverId = match errors::parse(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match engine.delete_driver(&id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

pub async fn list_vehicles(
    Extension(engine): Extension<Engine>,
    Query(query): Query<dto::CatalogQuery>,
) -> axum::response::Response {
    Json(engine.list_vehicles(query.active_only)).into_response()
}

pub async fn create_vehicle(
    Extension(engine): Extension<Engine>,
    Json(body): Json<VehicleDraft>,
) -> axum::response::Response {
    match engine.create_vehicle(&body) {
        Ok(vehicle) => (StatusCode::CREATED, Json(vehicle)).into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

pub async fn update_vehicle(
    Extension(engine): Extension<Engine>,
    Path(id): Path<String>,
    Json(body): Json<VehicleDraft>,
) -> axum::response::Response {
    let id: VehicleId = match errors::parse(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::ok_json(engine.update_vehicle(&id, &body))
}

pub async fn delete_vehicle(
    Extension(engine): Extension<Engine>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: VehicleId = match errors::parse(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match engine.delete_vehicle(&id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

//! Upstream feed endpoints: ERP order pushes and inventory snapshots.

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::put,
};
use serde_json::json;

use depot_core::OrderNumber;
use depot_infra::engine::{OrderFeed, SyncOutcome};

use crate::app::{Engine, dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/orders/:number", put(sync_order).delete(withdraw_order))
        .route("/stock", put(update_stock))
        .route("/stock/status", put(set_stock_status))
}

pub async fn sync_order(
    Extension(engine): Extension<Engine>,
    Path(number): Path<String>,
    Json(body): Json<OrderFeed>,
) -> axum::response::Response {
    let number: OrderNumber = match errors::parse(&number) {
        Ok(n) => n,
        Err(resp) => return resp,
    };
    match engine.sync_order(&number, body) {
        Ok(outcome) => {
            let status = if outcome == SyncOutcome::Created {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (status, Json(json!({ "number": number, "outcome": outcome }))).into_response()
        }
        Err(e) => errors::engine_error_to_response(e),
    }
}

pub async fn withdraw_order(
    Extension(engine): Extension<Engine>,
    Path(number): Path<String>,
) -> axum::response::Response {
    let number: OrderNumber = match errors::parse(&number) {
        Ok(n) => n,
        Err(resp) => return resp,
    };
    match engine.withdraw_order(&number) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

pub async fn update_stock(
    Extension(engine): Extension<Engine>,
    Json(body): Json<dto::StockFeedRequest>,
) -> axum::response::Response {
    match engine.update_stock(body.entries) {
        Ok(recorded) => Json(json!({ "recorded": recorded })).into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

pub async fn set_stock_status(
    Extension(engine): Extension<Engine>,
    Json(body): Json<dto::StockStatusRequest>,
) -> axum::response::Response {
    engine.set_stock_feed_online(body.available);
    Json(json!({ "available": engine.stock_feed_online() })).into_response()
}

//! Floor-facing endpoints: order listing, detail, workflow actions and image
//! issue reports.

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};

use depot_core::{OrderNumber, ReportId};
use depot_infra::engine::{DispatchRequest, LinePatch};
use depot_issues::IssueStatus;

use crate::app::{Engine, dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/overview", get(overview))
        .route("/orders", get(list_orders))
        .route("/orders/:number", get(order_detail))
        .route("/orders/:number/start", post(start_picking))
        .route("/orders/:number/lines/:row", patch(update_line))
        .route("/orders/:number/ready", post(mark_ready))
        .route("/orders/:number/loaded", post(mark_loaded))
        .route("/orders/:number/dispatch", post(dispatch))
        .route("/orders/:number/lines/:row/image-issues", post(report_image_issue))
        .route("/image-issues", get(list_image_issues))
        .route("/image-issues/:id", patch(update_image_issue))
}

pub async fn overview(Extension(engine): Extension<Engine>) -> axum::response::Response {
    Json(engine.overview()).into_response()
}

pub async fn list_orders(
    Extension(engine): Extension<Engine>,
    Query(query): Query<dto::OrderListQuery>,
) -> axum::response::Response {
    let filter = match query.into_filter() {
        Ok(f) => f,
        Err(e) => return errors::domain_error_to_response(e),
    };
    errors::ok_json(engine.list_orders(&filter))
}

pub async fn order_detail(
    Extension(engine): Extension<Engine>,
    Path(number): Path<String>,
) -> axum::response::Response {
    let number: OrderNumber = match errors::parse(&number) {
        Ok(n) => n,
        Err(resp) => return resp,
    };
    errors::ok_json(engine.order_detail(&number))
}

pub async fn start_picking(
    Extension(engine): Extension<Engine>,
    Path(number): Path<String>,
    Json(body): Json<dto::StartPickingRequest>,
) -> axum::response::Response {
    let number: OrderNumber = match errors::parse(&number) {
        Ok(n) => n,
        Err(resp) => return resp,
    };
    errors::ok_json(engine.start_picking(&number, &body.picker_id))
}

pub async fn update_line(
    Extension(engine): Extension<Engine>,
    Path((number, row)): Path<(String, u32)>,
    Json(body): Json<LinePatch>,
) -> axum::response::Response {
    let number: OrderNumber = match errors::parse(&number) {
        Ok(n) => n,
        Err(resp) => return resp,
    };
    errors::ok_json(engine.update_line(&number, row, body))
}

pub async fn mark_ready(
    Extension(engine): Extension<Engine>,
    Path(number): Path<String>,
) -> axum::response::Response {
    let number: OrderNumber = match errors::parse(&number) {
        Ok(n) => n,
        Err(resp) => return resp,
    };
    errors::ok_json(engine.mark_ready_for_loading(&number))
}

pub async fn mark_loaded(
    Extension(engine): Extension<Engine>,
    Path(number): Path<String>,
) -> axum::response::Response {
    let number: OrderNumber = match errors::parse(&number) {
        Ok(n) => n,
        Err(resp) => return resp,
    };
    errors::ok_json(engine.mark_loaded(&number))
}

pub async fn dispatch(
    Extension(engine): Extension<Engine>,
    Path(number): Path<String>,
    Json(body): Json<DispatchRequest>,
) -> axum::response::Response {
    let number: OrderNumber = match errors::parse(&number) {
        Ok(n) => n,
        Err(resp) => return resp,
    };
    errors::ok_json(engine.dispatch(&number, body))
}

pub async fn report_image_issue(
    Extension(engine): Extension<Engine>,
    Path((number, row)): Path<(String, u32)>,
    body: Option<Json<dto::ReportImageIssueRequest>>,
) -> axum::response::Response {
    let number: OrderNumber = match errors::parse(&number) {
        Ok(n) => n,
        Err(resp) => return resp,
    };
    let note = body.and_then(|Json(b)| b.note);

    match engine.report_image_issue(&number, row, note.as_deref()) {
        Ok(outcome) if outcome.already_reported => (StatusCode::OK, Json(outcome)).into_response(),
        Ok(outcome) => (StatusCode::CREATED, Json(outcome)).into_response(),
        Err(e) => errors::engine_error_to_response(e),
    }
}

pub async fn list_image_issues(
    Extension(engine): Extension<Engine>,
    Query(query): Query<dto::ImageIssueQuery>,
) -> axum::response::Response {
    match query.into_filter() {
        Ok(filter) => Json(engine.list_image_issues(&filter)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_image_issue(
    Extension(engine): Extension<Engine>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateImageIssueRequest>,
) -> axum::response::Response {
    let id: ReportId = match errors::parse(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let status: IssueStatus = match errors::parse(&body.status) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::ok_json(engine.update_image_issue(&id, status, body.note.as_deref()))
}

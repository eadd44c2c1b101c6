use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use depot_core::DomainError;
use depot_infra::EngineError;

pub fn engine_error_to_response(err: EngineError) -> axum::response::Response {
    match err {
        EngineError::Domain(e) => domain_error_to_response(e),
        EngineError::Store(e) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string()),
        EngineError::Projection(e) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "projection_error", e.to_string())
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        DomainError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", message),
        DomainError::IllegalTransition { from, to } => (
            StatusCode::CONFLICT,
            axum::Json(json!({
                "error": "illegal_transition",
                "message": message,
                "from": from,
                "to": to,
            })),
        )
            .into_response(),
        DomainError::Conflict(_) => json_error(StatusCode::CONFLICT, "conflict", message),
        DomainError::Validation(_) => json_error(StatusCode::BAD_REQUEST, "validation_error", message),
        DomainError::InvalidId(_) => json_error(StatusCode::BAD_REQUEST, "invalid_id", message),
        DomainError::UpstreamUnavailable(_) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "upstream_unavailable", message)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Parse a path or query value, rendering failures as a 400.
pub fn parse<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: core::str::FromStr<Err = DomainError>,
{
    raw.parse().map_err(domain_error_to_response)
}

/// Turn an engine result into `200 OK` with a JSON body.
pub fn ok_json<T: serde::Serialize>(result: Result<T, EngineError>) -> axum::response::Response {
    match result {
        Ok(body) => axum::Json(body).into_response(),
        Err(e) => engine_error_to_response(e),
    }
}

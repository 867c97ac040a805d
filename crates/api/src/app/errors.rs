use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use tenantry_core::DomainError;
use tenantry_infra::{DataError, StoreError};

pub fn data_error_to_response(err: DataError) -> axum::response::Response {
    match err {
        DataError::UnregisteredEntity(kind) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "model_error",
            format!("entity kind '{kind}' is not registered"),
        ),
        DataError::Store(e @ StoreError::NotFound { .. }) => {
            json_error(StatusCode::NOT_FOUND, "not_found", e.to_string())
        }
        DataError::Store(e @ StoreError::DuplicateKey { .. }) => {
            json_error(StatusCode::CONFLICT, "conflict", e.to_string())
        }
        DataError::Store(e) => {
            tracing::error!(error = %e, "store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
    }
}

pub fn not_found() -> axum::response::Response {
    json_error(StatusCode::NOT_FOUND, "not_found", "not found")
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

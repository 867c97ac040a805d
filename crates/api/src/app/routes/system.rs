use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use tenantry_auth::UserSession;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// The session the middleware built for this request.
pub async fn session(Extension(session): Extension<UserSession>) -> impl IntoResponse {
    Json(session)
}

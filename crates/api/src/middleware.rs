use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use tenantry_auth::{ClaimTypes, ClaimsIdentity, ClaimsPrincipal, UserSession};

/// Header carrying a JSON [`ClaimsIdentity`] for [`dev_identity_middleware`].
pub const DEV_IDENTITY_HEADER: &str = "x-dev-identity";

#[derive(Clone)]
pub struct SessionState {
    pub claim_types: Arc<ClaimTypes>,
}

/// Populate the request's [`UserSession`] from its [`ClaimsPrincipal`].
///
/// The principal is whatever the host's authentication layer put into the
/// request extensions. Every request leaves here with exactly one session;
/// requests without an authenticated principal get the default one.
pub async fn session_middleware(
    State(state): State<SessionState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let session = match req.extensions().get::<ClaimsPrincipal>() {
        Some(principal) if principal.is_authenticated() => {
            let session = UserSession::from_principal(principal, &state.claim_types);
            tracing::debug!(
                user_id = %session.user_id(),
                tenant_id = ?session.tenant_id(),
                roles = session.roles().len(),
                "session populated"
            );
            session
        }
        _ => UserSession::default(),
    };

    req.extensions_mut().insert(session);
    next.run(req).await
}

/// Dev/test stand-in for authentication: trusts [`DEV_IDENTITY_HEADER`].
///
/// No signature or credential is checked. Never enable in production.
pub async fn dev_identity_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    if let Some(identity) = extract_dev_identity(req.headers())? {
        req.extensions_mut()
            .insert(ClaimsPrincipal::new(vec![identity]));
    }

    Ok(next.run(req).await)
}

fn extract_dev_identity(headers: &HeaderMap) -> Result<Option<ClaimsIdentity>, StatusCode> {
    let Some(header) = headers.get(DEV_IDENTITY_HEADER) else {
        return Ok(None);
    };

    let raw = header.to_str().map_err(|_| StatusCode::BAD_REQUEST)?;
    serde_json::from_str(raw)
        .map(Some)
        .map_err(|_| StatusCode::BAD_REQUEST)
}

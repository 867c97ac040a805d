use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use tenantry_auth::UserSession;
use tenantry_infra::Store;

use crate::app::dto::WriteNoteRequest;
use crate::app::errors;
use crate::app::notes::Note;
use crate::app::services::Services;

pub fn router<S>() -> Router
where
    S: Store<Note> + 'static,
{
    Router::new()
        .route("/", get(list_notes::<S>).post(create_note::<S>))
        .route(
            "/:id",
            get(get_note::<S>).put(update_note::<S>).delete(delete_note::<S>),
        )
}

pub async fn list_notes<S>(
    Extension(services): Extension<Arc<Services<S>>>,
    Extension(session): Extension<UserSession>,
) -> axum::response::Response
where
    S: Store<Note> + 'static,
{
    let ctx = services.context(session);
    match ctx.query::<Note>().await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::data_error_to_response(e),
    }
}

pub async fn get_note<S>(
    Extension(services): Extension<Arc<Services<S>>>,
    Extension(session): Extension<UserSession>,
    Path(id): Path<Uuid>,
) -> axum::response::Response
where
    S: Store<Note> + 'static,
{
    let ctx = services.context(session);
    match ctx.find::<Note>(&id).await {
        Ok(Some(note)) => (StatusCode::OK, Json(note)).into_response(),
        Ok(None) => errors::not_found(),
        Err(e) => errors::data_error_to_response(e),
    }
}

pub async fn create_note<S>(
    Extension(services): Extension<Arc<Services<S>>>,
    Extension(session): Extension<UserSession>,
    Json(body): Json<WriteNoteRequest>,
) -> axum::response::Response
where
    S: Store<Note> + 'static,
{
    let title = match body.validated_title() {
        Ok(t) => t,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let note = Note::new(title, body.body);
    let id = note.id;

    let mut ctx = services.context(session);
    if let Err(e) = ctx.add(note) {
        return errors::data_error_to_response(e);
    }
    if let Err(e) = ctx.save_changes().await {
        return errors::data_error_to_response(e);
    }

    // Read back the stamped row.
    match ctx.find_unfiltered::<Note>(&id).await {
        Ok(Some(note)) => (StatusCode::CREATED, Json(note)).into_response(),
        Ok(None) => errors::not_found(),
        Err(e) => errors::data_error_to_response(e),
    }
}

pub async fn update_note<S>(
    Extension(services): Extension<Arc<Services<S>>>,
    Extension(session): Extension<UserSession>,
    Path(id): Path<Uuid>,
    Json(body): Json<WriteNoteRequest>,
) -> axum::response::Response
where
    S: Store<Note> + 'static,
{
    let title = match body.validated_title() {
        Ok(t) => t,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let mut ctx = services.context(session);
    let mut note = match ctx.find::<Note>(&id).await {
        Ok(Some(note)) => note,
        Ok(None) => return errors::not_found(),
        Err(e) => return errors::data_error_to_response(e),
    };

    note.title = title;
    note.body = body.body;
    if let Err(e) = ctx.update(note) {
        return errors::data_error_to_response(e);
    }
    if let Err(e) = ctx.save_changes().await {
        return errors::data_error_to_response(e);
    }

    match ctx.find::<Note>(&id).await {
        Ok(Some(note)) => (StatusCode::OK, Json(note)).into_response(),
        Ok(None) => errors::not_found(),
        Err(e) => errors::data_error_to_response(e),
    }
}

pub async fn delete_note<S>(
    Extension(services): Extension<Arc<Services<S>>>,
    Extension(session): Extension<UserSession>,
    Path(id): Path<Uuid>,
) -> axum::response::Response
where
    S: Store<Note> + 'static,
{
    let mut ctx = services.context(session);
    let note = match ctx.find::<Note>(&id).await {
        Ok(Some(note)) => note,
        Ok(None) => return errors::not_found(),
        Err(e) => return errors::data_error_to_response(e),
    };

    if let Err(e) = ctx.remove(note) {
        return errors::data_error_to_response(e);
    }
    match ctx.save_changes().await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::data_error_to_response(e),
    }
}

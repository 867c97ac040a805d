use axum::{Router, routing::get};

use tenantry_infra::Store;

use crate::app::notes::Note;

pub mod notes;
pub mod system;

/// Router for all session-aware endpoints.
pub fn router<S>() -> Router
where
    S: Store<Note> + 'static,
{
    Router::new()
        .route("/session", get(system::session))
        .nest("/notes", notes::router::<S>())
}

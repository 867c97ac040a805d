//! Demo host wiring (Axum router + service wiring).
//!
//! - `services.rs`: model registration and store selection
//! - `notes.rs`: the tenant-scoped record kind served by the demo
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use tenantry_infra::{InMemoryStore, PgStore, Store};

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod notes;
pub mod routes;
pub mod services;

use notes::Note;
use services::Services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: ApiConfig) -> anyhow::Result<Router> {
    let model = Arc::new(services::build_model());

    let routes = match &config.database_url {
        Some(url) => {
            let store = services::connect_postgres(url).await?;
            tracing::info!("using postgres store");
            routes_for(Services::<PgStore>::new(model, Arc::new(store)))
        }
        None => {
            tracing::info!("using in-memory store");
            routes_for(Services::<InMemoryStore>::new(model, Arc::new(InMemoryStore::new())))
        }
    };

    let session_state = middleware::SessionState {
        claim_types: Arc::new(config.claim_types.clone()),
    };

    let mut app = Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes)
        .layer(axum::middleware::from_fn_with_state(
            session_state,
            middleware::session_middleware,
        ));

    // Outermost, so the principal exists before the session is populated.
    if config.dev_identity {
        tracing::warn!("dev identity header enabled; requests are not authenticated");
        app = app.layer(axum::middleware::from_fn(middleware::dev_identity_middleware));
    }

    Ok(app.layer(ServiceBuilder::new()))
}

fn routes_for<S>(services: Services<S>) -> Router
where
    S: Store<Note> + 'static,
{
    routes::router::<S>().layer(Extension(Arc::new(services)))
}

use std::sync::Arc;

use sqlx::PgPool;

use tenantry_auth::UserSession;
use tenantry_infra::{DataContext, Model, PgStore, Transactional};

use crate::app::notes::Note;

/// Shared per-process services: the model and the store.
pub struct Services<S> {
    model: Arc<Model>,
    store: Arc<S>,
}

impl<S> Services<S>
where
    S: Transactional + 'static,
{
    pub fn new(model: Arc<Model>, store: Arc<S>) -> Self {
        Self { model, store }
    }

    /// Open a data context for one request.
    pub fn context(&self, session: UserSession) -> DataContext<S> {
        DataContext::new(self.model.clone(), self.store.clone(), session)
    }
}

/// Every record kind served by this host.
pub fn build_model() -> Model {
    Model::builder().entity::<Note>().build()
}

const NOTES_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS notes (
    id UUID PRIMARY KEY,
    tenant_id UUID NULL,
    title TEXT NOT NULL,
    body TEXT NOT NULL,
    is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
    created_by UUID NULL,
    created_at TIMESTAMPTZ NULL,
    modified_by UUID NULL,
    modified_at TIMESTAMPTZ NULL,
    deleted_by UUID NULL,
    deleted_at TIMESTAMPTZ NULL
)
"#;

pub async fn connect_postgres(database_url: &str) -> Result<PgStore, sqlx::Error> {
    let pool = PgPool::connect(database_url).await?;
    sqlx::query(NOTES_SCHEMA).execute(&pool).await?;
    Ok(PgStore::new(pool))
}

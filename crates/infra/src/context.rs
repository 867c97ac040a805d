//! Unit-of-work over a store, scoped to one user session.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use tenantry_auth::UserSession;
use tenantry_core::Entity;

use crate::filter::BoundFilter;
use crate::model::{EntityConfig, Model};
use crate::store::{Store, StoreError, Transactional};
use crate::tracker::{ChangeTracker, EntityState, Entry};

#[derive(Debug, Error)]
pub enum DataError {
    #[error("entity kind '{0}' is not registered in the model")]
    UnregisteredEntity(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Reads and writes records on behalf of one session.
///
/// Reads go through each kind's default filter. Writes are buffered until
/// [`DataContext::save_changes`], which stamps tenant and audit fields and
/// then commits every kind in one store transaction. A context belongs to a
/// single task; create one per request.
pub struct DataContext<S: Transactional> {
    model: Arc<Model>,
    store: Arc<S>,
    session: UserSession,
    tracker: ChangeTracker<S>,
}

impl<S> DataContext<S>
where
    S: Transactional + 'static,
{
    pub fn new(model: Arc<Model>, store: Arc<S>, session: UserSession) -> Self {
        Self {
            model,
            store,
            session,
            tracker: ChangeTracker::new(),
        }
    }

    pub fn session(&self) -> &UserSession {
        &self.session
    }

    /// Mutable session, e.g. to set `disable_tenant_filter` for this context.
    pub fn session_mut(&mut self) -> &mut UserSession {
        &mut self.session
    }

    fn config<E: Entity>(&self) -> Result<Arc<EntityConfig<E>>, DataError> {
        self.model
            .config::<E>()
            .ok_or(DataError::UnregisteredEntity(E::KIND))
    }

    fn track<E: Entity>(&mut self, entity: E, state: EntityState) -> Result<(), DataError>
    where
        S: Store<E>,
    {
        let config = self.config::<E>()?;
        self.tracker.track(config, Entry::new(entity, state));
        Ok(())
    }

    /// Insert on the next save.
    pub fn add<E: Entity>(&mut self, entity: E) -> Result<(), DataError>
    where
        S: Store<E>,
    {
        self.track(entity, EntityState::Added)
    }

    /// Overwrite the stored row on the next save.
    pub fn update<E: Entity>(&mut self, entity: E) -> Result<(), DataError>
    where
        S: Store<E>,
    {
        self.track(entity, EntityState::Modified)
    }

    /// Delete on the next save; soft-delete kinds are flagged instead.
    pub fn remove<E: Entity>(&mut self, entity: E) -> Result<(), DataError>
    where
        S: Store<E>,
    {
        self.track(entity, EntityState::Deleted)
    }

    /// Pending entries of one kind.
    pub fn entries<E: Entity>(&self) -> &[Entry<E>] {
        self.tracker.entries::<E>()
    }

    pub fn has_changes(&self) -> bool {
        !self.tracker.is_empty()
    }

    /// Rows visible through the kind's default filter.
    pub async fn query<E: Entity>(&self) -> Result<Vec<E>, DataError>
    where
        S: Store<E>,
    {
        let config = self.config::<E>()?;
        let filter = BoundFilter::new(&config, &self.session);
        Ok(self.store.fetch(&filter).await?)
    }

    /// Every row of the kind, ignoring default filters.
    pub async fn query_unfiltered<E: Entity>(&self) -> Result<Vec<E>, DataError>
    where
        S: Store<E>,
    {
        let config = self.config::<E>()?;
        let filter = BoundFilter::unfiltered(&config, &self.session);
        Ok(self.store.fetch(&filter).await?)
    }

    /// Row by id, `None` when missing or filtered out.
    pub async fn find<E: Entity>(&self, id: &E::Id) -> Result<Option<E>, DataError>
    where
        S: Store<E>,
    {
        let config = self.config::<E>()?;
        let filter = BoundFilter::new(&config, &self.session);
        Ok(self.store.fetch_one(id, &filter).await?)
    }

    pub async fn find_unfiltered<E: Entity>(&self, id: &E::Id) -> Result<Option<E>, DataError>
    where
        S: Store<E>,
    {
        let config = self.config::<E>()?;
        let filter = BoundFilter::unfiltered(&config, &self.session);
        Ok(self.store.fetch_one(id, &filter).await?)
    }

    /// Stamp and commit pending changes. Returns the number of rows written.
    pub async fn save_changes(&mut self) -> Result<usize, DataError> {
        self.save_changes_at(Utc::now()).await
    }

    /// As [`DataContext::save_changes`], with an explicit stamp time.
    pub async fn save_changes_at(&mut self, now: DateTime<Utc>) -> Result<usize, DataError> {
        if self.tracker.is_empty() {
            return Ok(0);
        }

        let written = self
            .tracker
            .commit(&*self.store, &self.session, now)
            .await?;

        tracing::debug!(
            written,
            user_id = %self.session.user_id(),
            tenant_id = ?self.session.tenant_id(),
            "saved changes"
        );
        Ok(written)
    }
}

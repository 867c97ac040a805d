//! Change tracking: records written through a context since the last save.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use tenantry_auth::UserSession;
use tenantry_core::Entity;

use crate::audit;
use crate::model::EntityConfig;
use crate::store::{Change, Store, StoreError, Transactional};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntityState {
    Added,
    Modified,
    Deleted,
}

/// A tracked record and what happens to it on save.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<E> {
    pub entity: E,
    pub state: EntityState,
}

impl<E: Entity> Entry<E> {
    pub fn new(entity: E, state: EntityState) -> Self {
        Self { entity, state }
    }

    fn to_change(&self) -> Change<E> {
        match self.state {
            EntityState::Added => Change::Insert(self.entity.clone()),
            EntityState::Modified => Change::Update(self.entity.clone()),
            EntityState::Deleted => Change::Delete(self.entity.id().clone()),
        }
    }
}

/// Pending entries of one kind, erased over the kind.
#[async_trait]
trait PendingSet<S: Transactional>: Send + Sync {
    fn len(&self) -> usize;
    async fn apply(
        &self,
        store: &S,
        tx: &mut S::Transaction,
        session: &UserSession,
        now: DateTime<Utc>,
    ) -> Result<usize, StoreError>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct EntrySet<E> {
    config: Arc<EntityConfig<E>>,
    entries: Vec<Entry<E>>,
}

impl<E: Entity> EntrySet<E> {
    fn track(&mut self, entry: Entry<E>) {
        let existing = self
            .entries
            .iter()
            .position(|e| e.entity.id() == entry.entity.id());

        let Some(i) = existing else {
            self.entries.push(entry);
            return;
        };

        match (self.entries[i].state, entry.state) {
            // Never stored: nothing to delete.
            (EntityState::Added, EntityState::Deleted) => {
                self.entries.remove(i);
            }
            (EntityState::Added, _) => self.entries[i].entity = entry.entity,
            _ => self.entries[i] = entry,
        }
    }

    /// Stamped writes for this save. Entries stay as tracked, so a failed save
    /// is stamped afresh on retry.
    fn changes(&self, session: &UserSession, now: DateTime<Utc>) -> Vec<Change<E>> {
        self.entries
            .iter()
            .map(|entry| {
                let mut stamped = entry.clone();
                audit::stamp(&self.config, &mut stamped, session, now);
                stamped.to_change()
            })
            .collect()
    }
}

#[async_trait]
impl<E, S> PendingSet<S> for EntrySet<E>
where
    E: Entity,
    S: Store<E>,
{
    fn len(&self) -> usize {
        self.entries.len()
    }

    async fn apply(
        &self,
        store: &S,
        tx: &mut S::Transaction,
        session: &UserSession,
        now: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        if self.entries.is_empty() {
            return Ok(0);
        }

        let written = store.apply(tx, self.changes(session, now)).await?;
        tracing::debug!(kind = E::KIND, written, "staged tracked changes");
        Ok(written)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Entries across all kinds, grouped per kind in first-tracked order.
pub struct ChangeTracker<S: Transactional> {
    sets: Vec<Box<dyn PendingSet<S>>>,
}

impl<S: Transactional> Default for ChangeTracker<S> {
    fn default() -> Self {
        Self { sets: Vec::new() }
    }
}

impl<S> ChangeTracker<S>
where
    S: Transactional + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a record. A second entry for the same id merges into the first.
    pub fn track<E>(&mut self, config: Arc<EntityConfig<E>>, entry: Entry<E>)
    where
        E: Entity,
        S: Store<E>,
    {
        if let Some(set) = self
            .sets
            .iter_mut()
            .find_map(|s| s.as_any_mut().downcast_mut::<EntrySet<E>>())
        {
            set.track(entry);
            return;
        }

        self.sets.push(Box::new(EntrySet {
            config,
            entries: vec![entry],
        }));
    }

    pub fn entries<E: Entity>(&self) -> &[Entry<E>] {
        self.sets
            .iter()
            .find_map(|s| s.as_any().downcast_ref::<EntrySet<E>>())
            .map(|set| set.entries.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.sets.iter().map(|s| s.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stamp and write every pending entry in one store transaction.
    ///
    /// On success the tracker is emptied. On failure nothing is written and
    /// every entry stays pending, unstamped.
    pub async fn commit(
        &mut self,
        store: &S,
        session: &UserSession,
        now: DateTime<Utc>,
    ) -> Result<usize, StoreError> {
        if self.is_empty() {
            return Ok(0);
        }

        let mut tx = store.begin().await?;
        let mut written = 0;
        for set in &self.sets {
            written += set.apply(store, &mut tx, session, now).await?;
        }
        store.commit_transaction(tx).await?;

        self.sets.clear();
        Ok(written)
    }
}

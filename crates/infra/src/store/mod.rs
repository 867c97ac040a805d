//! Storage backends for tracked records.

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryStore, InMemoryTransaction};
pub use postgres::{PgRecord, PgStore};

use async_trait::async_trait;
use thiserror::Error;

use tenantry_core::Entity;

use crate::filter::BoundFilter;

/// One write reaching storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change<E: Entity> {
    Insert(E),
    Update(E),
    Delete(E::Id),
}

impl<E: Entity> Change<E> {
    pub fn id(&self) -> &E::Id {
        match self {
            Change::Insert(e) | Change::Update(e) => e.id(),
            Change::Delete(id) => id,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} {id} already exists")]
    DuplicateKey { kind: &'static str, id: String },

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("store lock poisoned")]
    Poisoned,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub(crate) fn duplicate<E: Entity>(id: &E::Id) -> Self {
        Self::DuplicateKey {
            kind: E::KIND,
            id: format!("{id:?}"),
        }
    }

    pub(crate) fn not_found<E: Entity>(id: &E::Id) -> Self {
        Self::NotFound {
            kind: E::KIND,
            id: format!("{id:?}"),
        }
    }
}

/// Backend-wide unit of work.
///
/// Every kind's batch of one save is applied inside a single transaction;
/// dropping a transaction without committing discards all of it.
#[async_trait]
pub trait Transactional: Send + Sync {
    type Transaction: Send;

    async fn begin(&self) -> Result<Self::Transaction, StoreError>;

    async fn commit_transaction(&self, tx: Self::Transaction) -> Result<(), StoreError>;
}

/// Row storage for one record kind.
///
/// Reads receive the bound filter and must return only matching rows.
#[async_trait]
pub trait Store<E: Entity>: Transactional {
    async fn fetch(&self, filter: &BoundFilter<'_, E>) -> Result<Vec<E>, StoreError>;

    async fn fetch_one(&self, id: &E::Id, filter: &BoundFilter<'_, E>) -> Result<Option<E>, StoreError>;

    /// Add a batch to `tx`. Returns the number of rows it writes.
    async fn apply(&self, tx: &mut Self::Transaction, changes: Vec<Change<E>>) -> Result<usize, StoreError>;

    /// Apply one batch in its own transaction.
    async fn commit(&self, changes: Vec<Change<E>>) -> Result<usize, StoreError> {
        let mut tx = self.begin().await?;
        let written = self.apply(&mut tx, changes).await?;
        self.commit_transaction(tx).await?;
        Ok(written)
    }
}

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use tenantry_core::Entity;

use super::{Change, Store, StoreError, Transactional};
use crate::filter::BoundFilter;

type Tables = HashMap<TypeId, Box<dyn Any + Send + Sync>>;

type StagedBatch = Box<dyn FnOnce(&mut Staging<'_>) -> Result<(), StoreError> + Send>;

/// In-memory row store, one table per record kind.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

/// Batches queued for one commit. Nothing is visible until
/// [`Transactional::commit_transaction`] succeeds.
#[derive(Default)]
pub struct InMemoryTransaction {
    staged: Vec<StagedBatch>,
}

impl core::fmt::Debug for InMemoryTransaction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InMemoryTransaction")
            .field("batches", &self.staged.len())
            .finish()
    }
}

/// Scratch copies of the tables touched by a commit.
struct Staging<'a> {
    current: &'a Tables,
    next: Tables,
}

impl Staging<'_> {
    fn table_mut<E: Entity>(&mut self) -> Result<&mut Vec<E>, StoreError> {
        let key = TypeId::of::<E>();
        if !self.next.contains_key(&key) {
            let rows = self
                .current
                .get(&key)
                .and_then(|t| t.downcast_ref::<Vec<E>>())
                .cloned()
                .unwrap_or_default();
            self.next.insert(key, Box::new(rows));
        }

        self.next
            .get_mut(&key)
            .and_then(|t| t.downcast_mut::<Vec<E>>())
            .ok_or(StoreError::Poisoned)
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored row of a kind, bypassing filters. Test/dev inspection.
    pub fn rows<E: Entity>(&self) -> Vec<E> {
        self.read(|rows: &[E]| rows.to_vec()).unwrap_or_default()
    }

    fn read<E: Entity, T>(&self, f: impl FnOnce(&[E]) -> T) -> Result<T, StoreError> {
        let tables = self.tables.read().map_err(|_| StoreError::Poisoned)?;
        let rows = tables
            .get(&TypeId::of::<E>())
            .and_then(|t| t.downcast_ref::<Vec<E>>())
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        Ok(f(rows))
    }
}

fn apply_changes<E: Entity>(table: &mut Vec<E>, changes: &[Change<E>]) -> Result<(), StoreError> {
    for change in changes {
        let pos = table.iter().position(|e| e.id() == change.id());
        match (change, pos) {
            (Change::Insert(_), Some(_)) => return Err(StoreError::duplicate::<E>(change.id())),
            (Change::Insert(e), None) => table.push(e.clone()),
            (Change::Update(e), Some(i)) => table[i] = e.clone(),
            (Change::Delete(_), Some(i)) => {
                table.remove(i);
            }
            (Change::Update(_) | Change::Delete(_), None) => {
                return Err(StoreError::not_found::<E>(change.id()));
            }
        }
    }
    Ok(())
}

#[async_trait]
impl Transactional for InMemoryStore {
    type Transaction = InMemoryTransaction;

    async fn begin(&self) -> Result<InMemoryTransaction, StoreError> {
        Ok(InMemoryTransaction::default())
    }

    async fn commit_transaction(&self, tx: InMemoryTransaction) -> Result<(), StoreError> {
        let mut tables = self.tables.write().map_err(|_| StoreError::Poisoned)?;

        // Every batch runs against scratch copies; the tables are replaced only
        // once all of them succeed.
        let mut staging = Staging {
            current: &*tables,
            next: Tables::new(),
        };
        for batch in tx.staged {
            batch(&mut staging)?;
        }

        let next = staging.next;
        tables.extend(next);
        Ok(())
    }
}

#[async_trait]
impl<E: Entity> Store<E> for InMemoryStore {
    async fn fetch(&self, filter: &BoundFilter<'_, E>) -> Result<Vec<E>, StoreError> {
        self.read(|rows: &[E]| rows.iter().filter(|e| filter.matches(e)).cloned().collect())
    }

    async fn fetch_one(&self, id: &E::Id, filter: &BoundFilter<'_, E>) -> Result<Option<E>, StoreError> {
        self.read(|rows: &[E]| {
            rows.iter()
                .find(|e| e.id() == id)
                .filter(|e| filter.matches(e))
                .cloned()
        })
    }

    async fn apply(
        &self,
        tx: &mut InMemoryTransaction,
        changes: Vec<Change<E>>,
    ) -> Result<usize, StoreError> {
        let written = changes.len();
        tx.staged.push(Box::new(move |staging: &mut Staging<'_>| {
            apply_changes(staging.table_mut::<E>()?, &changes)
        }));
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tenantry_auth::UserSession;
    use tenantry_core::TenantId;

    use crate::model::Model;
    use crate::test_support::{Invoice, Tag};

    #[tokio::test]
    async fn failed_batch_leaves_table_untouched() {
        let store = InMemoryStore::new();
        let a = Invoice::owned_by(Some(TenantId::new()));
        let b = Invoice::owned_by(Some(TenantId::new()));

        store.commit(vec![Change::Insert(a.clone())]).await.unwrap();

        let err = store
            .commit(vec![Change::Insert(b.clone()), Change::Insert(a.clone())])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { kind: "invoice", .. }));
        assert_eq!(store.rows::<Invoice>(), vec![a]);
    }

    #[tokio::test]
    async fn update_and_delete_require_existing_rows() {
        let store = InMemoryStore::new();
        let a = Invoice::owned_by(None);

        let err = store.commit(vec![Change::Update(a.clone())]).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        let err = store.commit(vec![Change::<Invoice>::Delete(a.id)]).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn fetch_applies_the_bound_filter() {
        let model = Model::builder().entity::<Invoice>().build();
        let config = model.config::<Invoice>().unwrap();
        let tenant = TenantId::new();
        let session = UserSession::new(Default::default(), Some(tenant));

        let mine = Invoice::owned_by(Some(tenant));
        let theirs = Invoice::owned_by(Some(TenantId::new()));
        let store = InMemoryStore::new();
        store
            .commit(vec![Change::Insert(mine.clone()), Change::Insert(theirs.clone())])
            .await
            .unwrap();

        let filter = BoundFilter::new(&config, &session);
        assert_eq!(store.fetch(&filter).await.unwrap(), vec![mine.clone()]);
        assert_eq!(store.fetch_one(&theirs.id, &filter).await.unwrap(), None);
        assert_eq!(store.fetch_one(&mine.id, &filter).await.unwrap(), Some(mine));
    }

    #[tokio::test]
    async fn transaction_spanning_kinds_is_all_or_nothing() {
        let store = InMemoryStore::new();
        let invoice = Invoice::owned_by(None);

        let mut tx = store.begin().await.unwrap();
        store
            .apply(&mut tx, vec![Change::Insert(invoice.clone())])
            .await
            .unwrap();
        store
            .apply(&mut tx, vec![Change::Update(Tag::new("missing"))])
            .await
            .unwrap();

        let err = store.commit_transaction(tx).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: "tag", .. }));
        assert!(store.rows::<Invoice>().is_empty());
        assert!(store.rows::<Tag>().is_empty());

        let mut tx = store.begin().await.unwrap();
        store
            .apply(&mut tx, vec![Change::Insert(invoice.clone())])
            .await
            .unwrap();
        store
            .apply(&mut tx, vec![Change::Insert(Tag::new("urgent"))])
            .await
            .unwrap();
        store.commit_transaction(tx).await.unwrap();
        assert_eq!(store.rows::<Invoice>(), vec![invoice]);
        assert_eq!(store.rows::<Tag>().len(), 1);
    }

    #[tokio::test]
    async fn dropped_transaction_writes_nothing() {
        let store = InMemoryStore::new();

        let mut tx = store.begin().await.unwrap();
        store
            .apply(&mut tx, vec![Change::Insert(Tag::new("urgent"))])
            .await
            .unwrap();
        drop(tx);

        assert!(store.rows::<Tag>().is_empty());
    }
}

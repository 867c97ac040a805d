//! Postgres-backed row store.
//!
//! Default filters are rendered into the `WHERE` clause, so filtered rows never
//! leave the database. Session values are always bound as parameters.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::query_builder::Separated;
use sqlx::{FromRow, Postgres, QueryBuilder};
use uuid::Uuid;

use tenantry_core::Entity;

use super::{Change, Store, StoreError, Transactional};
use crate::filter::{BoundFilter, Predicate};

/// Table mapping for a record kind.
pub trait PgRecord: Entity + for<'r> FromRow<'r, PgRow> + Unpin {
    const TABLE: &'static str;
    const ID_COLUMN: &'static str = "id";

    /// Every stored column, in the order [`PgRecord::bind_columns`] binds them.
    const COLUMNS: &'static [&'static str];

    fn bind_columns<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>);

    fn bind_id<'args>(id: &Self::Id, query: &mut QueryBuilder<'args, Postgres>);
}

/// Row store over a connection pool. Each save runs in one transaction.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Append the filter as a boolean SQL expression.
pub fn push_filter<E: Entity>(query: &mut QueryBuilder<'_, Postgres>, filter: &BoundFilter<'_, E>) {
    push_predicate(query, filter, filter.predicate());
}

fn push_predicate<E: Entity>(
    query: &mut QueryBuilder<'_, Postgres>,
    filter: &BoundFilter<'_, E>,
    predicate: &Predicate,
) {
    let config = filter.config();
    let session = filter.session();

    match (predicate, config.deleted_column(), config.tenant_column()) {
        (Predicate::NotDeleted, Some(column), _) => {
            query.push("NOT ").push(column);
        }
        (Predicate::TenantMatches, _, Some(column)) => {
            query
                .push("(")
                .push_bind(session.disable_tenant_filter())
                .push(" OR ")
                .push(column)
                .push(" IS NOT DISTINCT FROM ")
                .push_bind(session.tenant_id().map(Uuid::from))
                .push(")");
        }
        (Predicate::And(a, b), _, _) => {
            query.push("(");
            push_predicate(query, filter, a);
            query.push(" AND ");
            push_predicate(query, filter, b);
            query.push(")");
        }
        // True, or a predicate whose capability is not registered.
        _ => {
            query.push("TRUE");
        }
    }
}

fn select<'args, E: PgRecord>() -> QueryBuilder<'args, Postgres> {
    QueryBuilder::new(format!(
        "SELECT {} FROM {} WHERE ",
        E::COLUMNS.join(", "),
        E::TABLE
    ))
}

pub fn select_query<'args, E: PgRecord>(filter: &BoundFilter<'_, E>) -> QueryBuilder<'args, Postgres> {
    let mut query = select::<E>();
    push_filter(&mut query, filter);
    query
}

pub fn select_one_query<'args, E: PgRecord>(
    id: &E::Id,
    filter: &BoundFilter<'_, E>,
) -> QueryBuilder<'args, Postgres> {
    let mut query = select::<E>();
    query.push(E::ID_COLUMN).push(" = ");
    E::bind_id(id, &mut query);
    query.push(" AND ");
    push_filter(&mut query, filter);
    query
}

pub fn change_query<'args, E: PgRecord>(change: &Change<E>) -> QueryBuilder<'args, Postgres> {
    let columns = E::COLUMNS.join(", ");

    match change {
        Change::Insert(entity) => {
            let mut query = QueryBuilder::new(format!("INSERT INTO {} ({columns}) ", E::TABLE));
            query.push_values(std::iter::once(entity), |mut row, e| e.bind_columns(&mut row));
            query
        }
        Change::Update(entity) => {
            let mut query = QueryBuilder::new(format!("UPDATE {} SET ({columns}) = ROW(", E::TABLE));
            {
                let mut row = query.separated(", ");
                entity.bind_columns(&mut row);
            }
            query.push(") WHERE ").push(E::ID_COLUMN).push(" = ");
            E::bind_id(entity.id(), &mut query);
            query
        }
        Change::Delete(id) => {
            let mut query =
                QueryBuilder::new(format!("DELETE FROM {} WHERE {} = ", E::TABLE, E::ID_COLUMN));
            E::bind_id(id, &mut query);
            query
        }
    }
}

#[async_trait]
impl Transactional for PgStore {
    type Transaction = sqlx::Transaction<'static, Postgres>;

    async fn begin(&self) -> Result<Self::Transaction, StoreError> {
        Ok(self.pool.begin().await?)
    }

    async fn commit_transaction(&self, tx: Self::Transaction) -> Result<(), StoreError> {
        Ok(tx.commit().await?)
    }
}

#[async_trait]
impl<E: PgRecord> Store<E> for PgStore {
    async fn fetch(&self, filter: &BoundFilter<'_, E>) -> Result<Vec<E>, StoreError> {
        let mut query = select_query(filter);
        Ok(query.build_query_as::<E>().fetch_all(&self.pool).await?)
    }

    async fn fetch_one(&self, id: &E::Id, filter: &BoundFilter<'_, E>) -> Result<Option<E>, StoreError> {
        let mut query = select_one_query(id, filter);
        Ok(query.build_query_as::<E>().fetch_optional(&self.pool).await?)
    }

    async fn apply(
        &self,
        tx: &mut Self::Transaction,
        changes: Vec<Change<E>>,
    ) -> Result<usize, StoreError> {
        let mut written = 0;

        for change in &changes {
            let mut query = change_query(change);
            let result = query.build().execute(&mut **tx).await?;
            if result.rows_affected() == 0 {
                // The caller drops the transaction, rolling back the whole save.
                return Err(StoreError::not_found::<E>(change.id()));
            }
            written += result.rows_affected() as usize;
        }

        Ok(written)
    }
}

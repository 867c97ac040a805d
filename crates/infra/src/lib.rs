//! Infrastructure layer: model registry, change tracking, stores.
//!
//! A [`Model`] is built once at startup from explicit per-kind registrations.
//! Each request then opens a [`DataContext`] with its [`UserSession`]:
//! reads are filtered by soft-delete and tenant, writes are stamped with
//! tenant and audit data before they reach the store.
//!
//! [`UserSession`]: tenantry_auth::UserSession

pub mod audit;
pub mod context;
pub mod filter;
pub mod model;
pub mod store;
pub mod tracker;

#[cfg(test)]
mod test_support;

pub use context::{DataContext, DataError};
pub use filter::{BoundFilter, Predicate};
pub use model::{EntityConfig, EntityModel, EntityTypeBuilder, Model, ModelBuilder};
pub use store::{
    Change, InMemoryStore, InMemoryTransaction, PgRecord, PgStore, Store, StoreError, Transactional,
};
pub use tracker::{ChangeTracker, EntityState, Entry};

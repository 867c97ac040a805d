//! `tenantry-core` — identifiers, entity contract and persistence capabilities.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod capability;
pub mod entity;
pub mod error;
pub mod id;

pub use capability::{AuditInfo, Audited, SoftDelete, TenantScoped};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{TenantId, UserId};

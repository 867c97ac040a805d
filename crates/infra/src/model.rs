//! Entity model: which record kinds exist and which capabilities they use.
//!
//! Every kind is registered once while the model is built. Registration picks
//! up the capability traits through bounds on [`EntityTypeBuilder`], so the
//! per-kind filter and stamping behavior is fixed before the first request.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use tenantry_core::{AuditInfo, Audited, Entity, SoftDelete, TenantId, TenantScoped};

use crate::filter::Predicate;

/// A record kind that declares its own model configuration.
pub trait EntityModel: Entity {
    fn configure(builder: &mut EntityTypeBuilder<Self>);
}

pub(crate) struct SoftDeleteBinding<E> {
    pub(crate) column: &'static str,
    pub(crate) is_deleted: fn(&E) -> bool,
    pub(crate) set_deleted: fn(&mut E, bool),
}

pub(crate) struct TenantBinding<E> {
    pub(crate) column: &'static str,
    pub(crate) tenant_id: fn(&E) -> Option<TenantId>,
    pub(crate) set_tenant_id: fn(&mut E, Option<TenantId>),
}

pub(crate) struct AuditBinding<E> {
    pub(crate) audit_mut: fn(&mut E) -> &mut AuditInfo,
}

/// Collects the capabilities of one record kind.
pub struct EntityTypeBuilder<E> {
    soft_delete: Option<SoftDeleteBinding<E>>,
    tenant: Option<TenantBinding<E>>,
    audit: Option<AuditBinding<E>>,
}

impl<E: Entity> EntityTypeBuilder<E> {
    fn new() -> Self {
        Self {
            soft_delete: None,
            tenant: None,
            audit: None,
        }
    }

    /// Exclude flagged rows from default reads; deletes become flag updates.
    pub fn soft_delete(&mut self) -> &mut Self
    where
        E: SoftDelete,
    {
        self.soft_delete = Some(SoftDeleteBinding {
            column: E::DELETED_COLUMN,
            is_deleted: <E as SoftDelete>::is_deleted,
            set_deleted: <E as SoftDelete>::set_deleted,
        });
        self
    }

    /// Stamp the session tenant on insert and hide other tenants' rows.
    ///
    /// The tenant filter is installed whether or not the kind is also soft-delete.
    pub fn tenant_scoped(&mut self) -> &mut Self
    where
        E: TenantScoped,
    {
        self.tenant = Some(TenantBinding {
            column: E::TENANT_COLUMN,
            tenant_id: <E as TenantScoped>::tenant_id,
            set_tenant_id: <E as TenantScoped>::set_tenant_id,
        });
        self
    }

    /// Stamp actor and time on insert, update and soft delete.
    pub fn audited(&mut self) -> &mut Self
    where
        E: Audited,
    {
        self.audit = Some(AuditBinding {
            audit_mut: <E as Audited>::audit_mut,
        });
        self
    }

    fn build(self) -> EntityConfig<E> {
        let mut filter = Predicate::True;
        if self.soft_delete.is_some() {
            filter = filter.and(Predicate::NotDeleted);
        }
        if self.tenant.is_some() {
            filter = filter.and(Predicate::TenantMatches);
        }

        EntityConfig {
            soft_delete: self.soft_delete,
            tenant: self.tenant,
            audit: self.audit,
            filter,
        }
    }
}

/// Resolved configuration of one record kind.
pub struct EntityConfig<E> {
    pub(crate) soft_delete: Option<SoftDeleteBinding<E>>,
    pub(crate) tenant: Option<TenantBinding<E>>,
    pub(crate) audit: Option<AuditBinding<E>>,
    filter: Predicate,
}

impl<E: Entity> EntityConfig<E> {
    pub fn kind(&self) -> &'static str {
        E::KIND
    }

    /// Default read filter installed for this kind.
    pub fn filter(&self) -> &Predicate {
        &self.filter
    }

    pub fn is_soft_delete(&self) -> bool {
        self.soft_delete.is_some()
    }

    pub fn is_tenant_scoped(&self) -> bool {
        self.tenant.is_some()
    }

    pub fn is_audited(&self) -> bool {
        self.audit.is_some()
    }

    pub fn deleted_column(&self) -> Option<&'static str> {
        self.soft_delete.as_ref().map(|b| b.column)
    }

    pub fn tenant_column(&self) -> Option<&'static str> {
        self.tenant.as_ref().map(|b| b.column)
    }

    pub(crate) fn is_deleted(&self, entity: &E) -> Option<bool> {
        self.soft_delete.as_ref().map(|b| (b.is_deleted)(entity))
    }

    pub(crate) fn tenant_of(&self, entity: &E) -> Option<Option<TenantId>> {
        self.tenant.as_ref().map(|b| (b.tenant_id)(entity))
    }
}

/// Builds an immutable [`Model`].
#[derive(Default)]
pub struct ModelBuilder {
    entities: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    kinds: Vec<&'static str>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a kind using its own [`EntityModel::configure`].
    pub fn entity<E: EntityModel>(self) -> Self {
        self.entity_with::<E>(E::configure)
    }

    /// Register a kind with an explicit configuration.
    ///
    /// Registering the same kind twice replaces the earlier configuration.
    pub fn entity_with<E: Entity>(mut self, configure: impl FnOnce(&mut EntityTypeBuilder<E>)) -> Self {
        let mut builder = EntityTypeBuilder::new();
        configure(&mut builder);
        let config = builder.build();

        tracing::debug!(
            kind = config.kind(),
            soft_delete = config.is_soft_delete(),
            tenant_scoped = config.is_tenant_scoped(),
            audited = config.is_audited(),
            "registered entity"
        );

        if self
            .entities
            .insert(TypeId::of::<E>(), Arc::new(config))
            .is_none()
        {
            self.kinds.push(E::KIND);
        }
        self
    }

    pub fn build(self) -> Model {
        Model {
            entities: self.entities,
            kinds: self.kinds,
        }
    }
}

/// Registry of record kinds, built once at startup and shared via `Arc`.
pub struct Model {
    entities: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    kinds: Vec<&'static str>,
}

impl Model {
    pub fn builder() -> ModelBuilder {
        ModelBuilder::new()
    }

    pub fn config<E: Entity>(&self) -> Option<Arc<EntityConfig<E>>> {
        self.entities
            .get(&TypeId::of::<E>())
            .cloned()
            .and_then(|c| c.downcast::<EntityConfig<E>>().ok())
    }

    /// Registered kind names, in registration order.
    pub fn kinds(&self) -> &[&'static str] {
        &self.kinds
    }
}

impl core::fmt::Debug for Model {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Model").field("kinds", &self.kinds).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Invoice, Journal, Setting, Tag};

    #[test]
    fn filters_follow_registered_capabilities() {
        let model = Model::builder()
            .entity::<Invoice>()
            .entity::<Tag>()
            .entity::<Setting>()
            .entity::<Journal>()
            .build();

        let invoice = model.config::<Invoice>().unwrap();
        assert_eq!(invoice.kind(), "invoice");
        assert_eq!(
            invoice.filter(),
            &Predicate::And(Box::new(Predicate::NotDeleted), Box::new(Predicate::TenantMatches))
        );
        assert_eq!(invoice.deleted_column(), Some("is_deleted"));
        assert_eq!(invoice.tenant_column(), Some("tenant_id"));

        assert_eq!(model.config::<Tag>().unwrap().filter(), &Predicate::NotDeleted);
        assert_eq!(model.config::<Setting>().unwrap().filter(), &Predicate::TenantMatches);
        assert_eq!(model.config::<Journal>().unwrap().filter(), &Predicate::True);
        assert_eq!(model.kinds(), &["invoice", "tag", "setting", "journal"]);
    }

    #[test]
    fn implementing_a_trait_without_registering_it_installs_nothing() {
        // Invoice implements every capability, but only audit is registered here.
        let model = Model::builder()
            .entity_with::<Invoice>(|b| {
                b.audited();
            })
            .build();

        let config = model.config::<Invoice>().unwrap();
        assert!(config.is_audited());
        assert!(!config.is_soft_delete());
        assert_eq!(config.filter(), &Predicate::True);
    }

    #[test]
    fn unregistered_kind_has_no_config() {
        let model = Model::builder().entity::<Tag>().build();
        assert!(model.config::<Invoice>().is_none());
    }
}

//! Save-time stamping of tenant ownership and audit metadata.

use chrono::{DateTime, Utc};

use tenantry_auth::UserSession;
use tenantry_core::Entity;

use crate::model::EntityConfig;
use crate::tracker::{EntityState, Entry};

/// Stamp one entry right before it is written.
///
/// - added: tenant from the session (when it has one), creation audit
/// - modified: modification audit
/// - deleted soft-delete kinds: flag set, entry becomes an update, deletion audit
pub fn stamp<E: Entity>(
    config: &EntityConfig<E>,
    entry: &mut Entry<E>,
    session: &UserSession,
    now: DateTime<Utc>,
) {
    let actor = session.actor();

    match entry.state {
        EntityState::Added => {
            if let (Some(tenant), Some(tenant_id)) = (&config.tenant, session.tenant_id()) {
                (tenant.set_tenant_id)(&mut entry.entity, Some(tenant_id));
            }
            if let Some(audit) = &config.audit {
                (audit.audit_mut)(&mut entry.entity).mark_created(actor, now);
            }
        }
        EntityState::Modified => {
            if let Some(audit) = &config.audit {
                (audit.audit_mut)(&mut entry.entity).mark_modified(actor, now);
            }
        }
        EntityState::Deleted => {
            let Some(soft_delete) = &config.soft_delete else {
                return;
            };
            (soft_delete.set_deleted)(&mut entry.entity, true);
            entry.state = EntityState::Modified;
            if let Some(audit) = &config.audit {
                (audit.audit_mut)(&mut entry.entity).mark_deleted(actor, now);
            }
        }
    }
}

//! Capabilities a record kind can opt into.
//!
//! The data layer only acts on a capability when the record kind registers it
//! in the model; implementing the trait alone changes nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{TenantId, UserId};

/// Records carrying a boolean deletion flag.
pub trait SoftDelete {
    /// Storage column holding the flag.
    const DELETED_COLUMN: &'static str = "is_deleted";

    fn is_deleted(&self) -> bool;
    fn set_deleted(&mut self, deleted: bool);
}

/// Records owned by a tenant.
///
/// `None` marks a host-level record that belongs to no tenant.
pub trait TenantScoped {
    /// Storage column holding the owner.
    const TENANT_COLUMN: &'static str = "tenant_id";

    fn tenant_id(&self) -> Option<TenantId>;
    fn set_tenant_id(&mut self, tenant_id: Option<TenantId>);
}

/// Creation, modification and deletion metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditInfo {
    pub created_by: Option<UserId>,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_by: Option<UserId>,
    pub modified_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<UserId>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl AuditInfo {
    pub fn mark_created(&mut self, by: Option<UserId>, at: DateTime<Utc>) {
        self.created_by = by;
        self.created_at = Some(at);
    }

    pub fn mark_modified(&mut self, by: Option<UserId>, at: DateTime<Utc>) {
        self.modified_by = by;
        self.modified_at = Some(at);
    }

    pub fn mark_deleted(&mut self, by: Option<UserId>, at: DateTime<Utc>) {
        self.deleted_by = by;
        self.deleted_at = Some(at);
    }
}

/// Records carrying audit metadata, stamped on save.
pub trait Audited {
    fn audit_mut(&mut self) -> &mut AuditInfo;
}

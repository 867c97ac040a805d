//! Record kinds covering each capability combination.

use sqlx::postgres::{PgRow, Postgres};
use sqlx::query_builder::Separated;
use sqlx::{FromRow, QueryBuilder, Row};
use uuid::Uuid;

use tenantry_core::{AuditInfo, Audited, Entity, SoftDelete, TenantId, TenantScoped};

use crate::model::{EntityModel, EntityTypeBuilder};
use crate::store::PgRecord;

/// Tenant-scoped, soft-deletable, audited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    pub id: Uuid,
    pub tenant_id: Option<TenantId>,
    pub number: String,
    pub is_deleted: bool,
    pub audit: AuditInfo,
}

impl Invoice {
    pub fn owned_by(tenant_id: Option<TenantId>) -> Self {
        Self {
            id: Uuid::now_v7(),
            tenant_id,
            number: "INV-1".to_string(),
            is_deleted: false,
            audit: AuditInfo::default(),
        }
    }
}

impl Entity for Invoice {
    type Id = Uuid;
    const KIND: &'static str = "invoice";

    fn id(&self) -> &Uuid {
        &self.id
    }
}

impl SoftDelete for Invoice {
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.is_deleted = deleted;
    }
}

impl TenantScoped for Invoice {
    fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    fn set_tenant_id(&mut self, tenant_id: Option<TenantId>) {
        self.tenant_id = tenant_id;
    }
}

impl Audited for Invoice {
    fn audit_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit
    }
}

impl EntityModel for Invoice {
    fn configure(builder: &mut EntityTypeBuilder<Self>) {
        builder.soft_delete().tenant_scoped().audited();
    }
}

impl<'r> FromRow<'r, PgRow> for Invoice {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            tenant_id: row.try_get::<Option<Uuid>, _>("tenant_id")?.map(TenantId::from),
            number: row.try_get("number")?,
            is_deleted: row.try_get("is_deleted")?,
            audit: AuditInfo {
                created_by: row.try_get::<Option<Uuid>, _>("created_by")?.map(Into::into),
                created_at: row.try_get("created_at")?,
                modified_by: row.try_get::<Option<Uuid>, _>("modified_by")?.map(Into::into),
                modified_at: row.try_get("modified_at")?,
                deleted_by: row.try_get::<Option<Uuid>, _>("deleted_by")?.map(Into::into),
                deleted_at: row.try_get("deleted_at")?,
            },
        })
    }
}

impl PgRecord for Invoice {
    const TABLE: &'static str = "invoices";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "tenant_id",
        "number",
        "is_deleted",
        "created_by",
        "created_at",
        "modified_by",
        "modified_at",
        "deleted_by",
        "deleted_at",
    ];

    fn bind_columns<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(self.id)
            .push_bind(self.tenant_id.map(Uuid::from))
            .push_bind(self.number.clone())
            .push_bind(self.is_deleted)
            .push_bind(self.audit.created_by.map(Uuid::from))
            .push_bind(self.audit.created_at)
            .push_bind(self.audit.modified_by.map(Uuid::from))
            .push_bind(self.audit.modified_at)
            .push_bind(self.audit.deleted_by.map(Uuid::from))
            .push_bind(self.audit.deleted_at);
    }

    fn bind_id<'args>(id: &Uuid, query: &mut QueryBuilder<'args, Postgres>) {
        query.push_bind(*id);
    }
}

/// Soft-deletable only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: Uuid,
    pub label: String,
    pub is_deleted: bool,
}

impl Tag {
    pub fn new(label: &str) -> Self {
        Self {
            id: Uuid::now_v7(),
            label: label.to_string(),
            is_deleted: false,
        }
    }
}

impl Entity for Tag {
    type Id = Uuid;
    const KIND: &'static str = "tag";

    fn id(&self) -> &Uuid {
        &self.id
    }
}

impl SoftDelete for Tag {
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.is_deleted = deleted;
    }
}

impl EntityModel for Tag {
    fn configure(builder: &mut EntityTypeBuilder<Self>) {
        builder.soft_delete();
    }
}

impl<'r> FromRow<'r, PgRow> for Tag {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            label: row.try_get("label")?,
            is_deleted: row.try_get("is_deleted")?,
        })
    }
}

impl PgRecord for Tag {
    const TABLE: &'static str = "tags";
    const COLUMNS: &'static [&'static str] = &["id", "label", "is_deleted"];

    fn bind_columns<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(self.id)
            .push_bind(self.label.clone())
            .push_bind(self.is_deleted);
    }

    fn bind_id<'args>(id: &Uuid, query: &mut QueryBuilder<'args, Postgres>) {
        query.push_bind(*id);
    }
}

/// Tenant-scoped only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting {
    pub id: Uuid,
    pub tenant_id: Option<TenantId>,
    pub key: String,
}

impl Setting {
    pub fn new(key: &str) -> Self {
        Self {
            id: Uuid::now_v7(),
            tenant_id: None,
            key: key.to_string(),
        }
    }
}

impl Entity for Setting {
    type Id = Uuid;
    const KIND: &'static str = "setting";

    fn id(&self) -> &Uuid {
        &self.id
    }
}

impl TenantScoped for Setting {
    fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    fn set_tenant_id(&mut self, tenant_id: Option<TenantId>) {
        self.tenant_id = tenant_id;
    }
}

impl EntityModel for Setting {
    fn configure(builder: &mut EntityTypeBuilder<Self>) {
        builder.tenant_scoped();
    }
}

/// No capabilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Journal {
    pub id: Uuid,
    pub line: String,
}

impl Journal {
    pub fn new(line: &str) -> Self {
        Self {
            id: Uuid::now_v7(),
            line: line.to_string(),
        }
    }
}

impl Entity for Journal {
    type Id = Uuid;
    const KIND: &'static str = "journal";

    fn id(&self) -> &Uuid {
        &self.id
    }
}

impl EntityModel for Journal {
    fn configure(_builder: &mut EntityTypeBuilder<Self>) {}
}

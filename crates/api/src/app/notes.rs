//! Notes: tenant-scoped, soft-deletable, audited.

use serde::Serialize;
use sqlx::postgres::{PgRow, Postgres};
use sqlx::query_builder::Separated;
use sqlx::{FromRow, QueryBuilder, Row};
use uuid::Uuid;

use tenantry_core::{AuditInfo, Audited, Entity, SoftDelete, TenantId, TenantScoped};
use tenantry_infra::{EntityModel, EntityTypeBuilder, PgRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub id: Uuid,
    pub tenant_id: Option<TenantId>,
    pub title: String,
    pub body: String,
    #[serde(skip)]
    pub is_deleted: bool,
    #[serde(flatten)]
    pub audit: AuditInfo,
}

impl Note {
    /// A fresh note; tenant and audit fields are filled in on save.
    pub fn new(title: String, body: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            tenant_id: None,
            title,
            body,
            is_deleted: false,
            audit: AuditInfo::default(),
        }
    }
}

impl Entity for Note {
    type Id = Uuid;
    const KIND: &'static str = "note";

    fn id(&self) -> &Uuid {
        &self.id
    }
}

impl SoftDelete for Note {
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.is_deleted = deleted;
    }
}

impl TenantScoped for Note {
    fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    fn set_tenant_id(&mut self, tenant_id: Option<TenantId>) {
        self.tenant_id = tenant_id;
    }
}

impl Audited for Note {
    fn audit_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit
    }
}

impl EntityModel for Note {
    fn configure(builder: &mut EntityTypeBuilder<Self>) {
        builder.soft_delete().tenant_scoped().audited();
    }
}

impl<'r> FromRow<'r, PgRow> for Note {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            tenant_id: row.try_get::<Option<Uuid>, _>("tenant_id")?.map(TenantId::from),
            title: row.try_get("title")?,
            body: row.try_get("body")?,
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

impl PgRecord for Note {
    const TABLE: &'static str = "notes";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "tenant_id",
        "title",
        "body",
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
            .push_bind(self.title.clone())
            .push_bind(self.body.clone())
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

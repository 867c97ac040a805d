//! Default read filters.
//!
//! A filter is a small predicate tree fixed per record kind when the model is
//! built. It is bound to the session at query time, then either evaluated in
//! memory or rendered into the backend's query language.

use tenantry_auth::UserSession;
use tenantry_core::Entity;

use crate::model::EntityConfig;

/// Predicate over one record, parameterized by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Matches every row.
    True,
    /// Soft-delete flag is false.
    NotDeleted,
    /// Tenant equals the session tenant, or the session disables the tenant filter.
    TenantMatches,
    And(Box<Predicate>, Box<Predicate>),
}

impl Predicate {
    /// Conjunction, folding away `True`.
    pub fn and(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Predicate::True, p) | (p, Predicate::True) => p,
            (a, b) => Predicate::And(Box::new(a), Box::new(b)),
        }
    }
}

static MATCH_ALL: Predicate = Predicate::True;

/// A kind's filter bound to the current session.
pub struct BoundFilter<'a, E> {
    config: &'a EntityConfig<E>,
    session: &'a UserSession,
    predicate: &'a Predicate,
}

impl<'a, E: Entity> BoundFilter<'a, E> {
    /// The kind's default filter.
    pub fn new(config: &'a EntityConfig<E>, session: &'a UserSession) -> Self {
        Self {
            config,
            session,
            predicate: config.filter(),
        }
    }

    /// A filter matching every row (filters ignored).
    pub fn unfiltered(config: &'a EntityConfig<E>, session: &'a UserSession) -> Self {
        Self {
            config,
            session,
            predicate: &MATCH_ALL,
        }
    }

    pub fn config(&self) -> &'a EntityConfig<E> {
        self.config
    }

    pub fn session(&self) -> &'a UserSession {
        self.session
    }

    pub fn predicate(&self) -> &'a Predicate {
        self.predicate
    }

    /// Evaluate against an in-memory record.
    pub fn matches(&self, entity: &E) -> bool {
        self.eval(self.predicate, entity)
    }

    fn eval(&self, predicate: &Predicate, entity: &E) -> bool {
        match predicate {
            Predicate::True => true,
            Predicate::NotDeleted => !self.config.is_deleted(entity).unwrap_or(false),
            Predicate::TenantMatches => {
                self.session.disable_tenant_filter()
                    || self
                        .config
                        .tenant_of(entity)
                        .is_none_or(|tenant| tenant == self.session.tenant_id())
            }
            Predicate::And(a, b) => self.eval(a, entity) && self.eval(b, entity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tenantry_core::TenantId;

    use crate::model::Model;
    use crate::test_support::Invoice;

    #[test]
    fn and_folds_true() {
        assert_eq!(Predicate::True.and(Predicate::NotDeleted), Predicate::NotDeleted);
        assert_eq!(Predicate::TenantMatches.and(Predicate::True), Predicate::TenantMatches);
        assert_eq!(Predicate::True.and(Predicate::True), Predicate::True);
    }

    #[test]
    fn tenant_and_soft_delete_filter() {
        let model = Model::builder().entity::<Invoice>().build();
        let config = model.config::<Invoice>().unwrap();

        let tenant = TenantId::new();
        let mut session = UserSession::new(Default::default(), Some(tenant));

        let mine = Invoice::owned_by(Some(tenant));
        let theirs = Invoice::owned_by(Some(TenantId::new()));
        let host = Invoice::owned_by(None);
        let mut deleted = Invoice::owned_by(Some(tenant));
        deleted.is_deleted = true;

        let filter = BoundFilter::new(&config, &session);
        assert!(filter.matches(&mine));
        assert!(!filter.matches(&theirs));
        assert!(!filter.matches(&host));
        assert!(!filter.matches(&deleted));

        session.set_disable_tenant_filter(true);
        let filter = BoundFilter::new(&config, &session);
        assert!(filter.matches(&theirs));
        assert!(filter.matches(&host));
        assert!(!filter.matches(&deleted));

        assert!(BoundFilter::unfiltered(&config, &session).matches(&deleted));
    }

    #[test]
    fn tenantless_session_sees_tenantless_rows() {
        let model = Model::builder().entity::<Invoice>().build();
        let config = model.config::<Invoice>().unwrap();
        let session = UserSession::default();

        let filter = BoundFilter::new(&config, &session);
        assert!(filter.matches(&Invoice::owned_by(None)));
        assert!(!filter.matches(&Invoice::owned_by(Some(TenantId::new()))));
    }
}

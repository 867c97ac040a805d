//! Per-request user session.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use tenantry_core::{TenantId, UserId};

use crate::{ClaimTypes, ClaimsPrincipal, Role, convert_or_default};

/// Identity of the caller for the lifetime of one request.
///
/// Starts empty; [`UserSession::populate`] fills it from an authenticated
/// principal. The data layer reads the tenant and actor from here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    user_id: UserId,
    tenant_id: Option<TenantId>,
    user_name: String,
    roles: BTreeSet<Role>,
    disable_tenant_filter: bool,
}

impl UserSession {
    /// Session for an already-known caller (workers, tests).
    pub fn new(user_id: UserId, tenant_id: Option<TenantId>) -> Self {
        Self {
            user_id,
            tenant_id,
            ..Self::default()
        }
    }

    /// Build a session from the request principal.
    ///
    /// Unauthenticated principals give the default session.
    pub fn from_principal(principal: &ClaimsPrincipal, claim_types: &ClaimTypes) -> Self {
        let mut session = Self::default();
        session.populate(principal, claim_types);
        session
    }

    /// Copy identity claims into the session.
    ///
    /// Does nothing unless the principal is authenticated. Missing or
    /// malformed claims leave the field at its zero value.
    pub fn populate(&mut self, principal: &ClaimsPrincipal, claim_types: &ClaimTypes) {
        if !principal.is_authenticated() {
            return;
        }

        self.user_id = convert_or_default(principal.find_first(&claim_types.user_id));
        self.tenant_id = convert_or_default(principal.find_first(&claim_types.tenant_id));
        self.roles = principal
            .find_all(&claim_types.role)
            .map(|r| Role::new(r.to_string()))
            .collect();
        self.user_name = convert_or_default(principal.find_first(&claim_types.user_name));
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn set_user_id(&mut self, user_id: UserId) {
        self.user_id = user_id;
    }

    /// Actor recorded in audit fields; `None` for the nil user.
    pub fn actor(&self) -> Option<UserId> {
        (!self.user_id.is_nil()).then_some(self.user_id)
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    pub fn set_tenant_id(&mut self, tenant_id: Option<TenantId>) {
        self.tenant_id = tenant_id;
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn set_user_name(&mut self, user_name: impl Into<String>) {
        self.user_name = user_name.into();
    }

    pub fn roles(&self) -> &BTreeSet<Role> {
        &self.roles
    }

    pub fn set_roles(&mut self, roles: impl IntoIterator<Item = Role>) {
        self.roles = roles.into_iter().collect();
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.as_str() == role)
    }

    pub fn disable_tenant_filter(&self) -> bool {
        self.disable_tenant_filter
    }

    pub fn set_disable_tenant_filter(&mut self, disable: bool) {
        self.disable_tenant_filter = disable;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::types;
    use crate::{Claim, ClaimsIdentity};

    fn principal(claims: Vec<Claim>) -> ClaimsPrincipal {
        ClaimsPrincipal::new(vec![ClaimsIdentity::authenticated("Bearer", claims)])
    }

    #[test]
    fn authenticated_principal_populates_every_field() {
        let user_id = UserId::new();
        let tenant_id = TenantId::new();
        let p = principal(vec![
            Claim::new(types::USER_ID, user_id.to_string()),
            Claim::new(types::TENANT_ID, tenant_id.to_string()),
            Claim::new(types::USER_NAME, "ana"),
            Claim::new(types::ROLE, "admin"),
            Claim::new(types::ROLE, "clerk"),
        ]);

        let session = UserSession::from_principal(&p, &ClaimTypes::default());

        assert_eq!(session.user_id(), user_id);
        assert_eq!(session.tenant_id(), Some(tenant_id));
        assert_eq!(session.user_name(), "ana");
        assert!(session.has_role("admin"));
        assert!(session.has_role("clerk"));
        assert_eq!(session.roles().len(), 2);
        assert!(!session.disable_tenant_filter());
    }

    #[test]
    fn unauthenticated_principal_leaves_session_untouched() {
        let p = ClaimsPrincipal::new(vec![ClaimsIdentity {
            authentication_type: None,
            claims: vec![Claim::new(types::USER_NAME, "ana")],
        }]);

        let session = UserSession::from_principal(&p, &ClaimTypes::default());
        assert_eq!(session, UserSession::default());
    }

    #[test]
    fn malformed_claims_become_zero_values() {
        let p = principal(vec![
            Claim::new(types::USER_ID, "not-a-uuid"),
            Claim::new(types::TENANT_ID, "42"),
            Claim::new(types::USER_NAME, "ana"),
        ]);

        let session = UserSession::from_principal(&p, &ClaimTypes::default());

        assert!(session.user_id().is_nil());
        assert_eq!(session.actor(), None);
        assert_eq!(session.tenant_id(), None);
        assert_eq!(session.user_name(), "ana");
        assert!(session.roles().is_empty());
    }

    #[test]
    fn custom_claim_types_are_honored() {
        let tenant_id = TenantId::new();
        let claim_types = ClaimTypes {
            tenant_id: "org".to_string(),
            role: "role".to_string(),
            ..ClaimTypes::default()
        };
        let p = principal(vec![
            Claim::new("org", tenant_id.to_string()),
            Claim::new(types::TENANT_ID, TenantId::new().to_string()),
            Claim::new("role", "viewer"),
        ]);

        let session = UserSession::from_principal(&p, &claim_types);
        assert_eq!(session.tenant_id(), Some(tenant_id));
        assert!(session.has_role("viewer"));
    }
}

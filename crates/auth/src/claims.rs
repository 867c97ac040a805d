//! Claims model (transport-agnostic).

use serde::{Deserialize, Serialize};

/// Well-known claim-type keys.
pub mod types {
    pub const USER_ID: &str = "userid";
    pub const TENANT_ID: &str = "tenantid";
    pub const USER_NAME: &str = "username";
    pub const ROLE: &str = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role";
}

/// A single key/value assertion about an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    #[serde(rename = "type")]
    pub claim_type: String,
    pub value: String,
}

impl Claim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}

/// One identity of a principal (e.g. one authentication scheme).
///
/// An identity is authenticated when it records how it was authenticated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimsIdentity {
    #[serde(default)]
    pub authentication_type: Option<String>,
    #[serde(default)]
    pub claims: Vec<Claim>,
}

impl ClaimsIdentity {
    pub fn authenticated(authentication_type: impl Into<String>, claims: Vec<Claim>) -> Self {
        Self {
            authentication_type: Some(authentication_type.into()),
            claims,
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authentication_type.is_some()
    }
}

/// The caller as seen by the request pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimsPrincipal {
    pub identities: Vec<ClaimsIdentity>,
}

impl ClaimsPrincipal {
    pub fn new(identities: Vec<ClaimsIdentity>) -> Self {
        Self { identities }
    }

    /// True when at least one identity is authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.identities.iter().any(ClaimsIdentity::is_authenticated)
    }

    /// All claims across all identities, in identity order.
    pub fn claims(&self) -> impl Iterator<Item = &Claim> {
        self.identities.iter().flat_map(|id| id.claims.iter())
    }

    /// Value of the first claim with the given type.
    pub fn find_first(&self, claim_type: &str) -> Option<&str> {
        self.claims()
            .find(|c| c.claim_type == claim_type)
            .map(|c| c.value.as_str())
    }

    /// Values of every claim with the given type.
    pub fn find_all<'a>(&'a self, claim_type: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.claims()
            .filter(move |c| c.claim_type == claim_type)
            .map(|c| c.value.as_str())
    }
}

/// Claim-type keys the session populator reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimTypes {
    pub user_id: String,
    pub tenant_id: String,
    pub user_name: String,
    pub role: String,
}

impl Default for ClaimTypes {
    fn default() -> Self {
        Self {
            user_id: types::USER_ID.to_string(),
            tenant_id: types::TENANT_ID.to_string(),
            user_name: types::USER_NAME.to_string(),
            role: types::ROLE.to_string(),
        }
    }
}

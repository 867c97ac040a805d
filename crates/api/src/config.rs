//! Configuration loading and representation.

use tenantry_auth::ClaimTypes;

/// Runtime configuration for the API host.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
    /// Postgres connection string; the in-memory store is used when absent.
    pub database_url: Option<String>,
    pub claim_types: ClaimTypes,
    /// Trust the `x-dev-identity` header as the caller's identity.
    pub dev_identity: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            database_url: None,
            claim_types: ClaimTypes::default(),
            dev_identity: false,
        }
    }
}

impl ApiConfig {
    /// Read configuration from the environment, falling back to defaults.
    ///
    /// - `TENANTRY_BIND_ADDR`
    /// - `DATABASE_URL`
    /// - `TENANTRY_DEV_IDENTITY` (`true`/`1` to enable)
    /// - `TENANTRY_CLAIM_USER_ID`, `TENANTRY_CLAIM_TENANT_ID`,
    ///   `TENANTRY_CLAIM_USER_NAME`, `TENANTRY_CLAIM_ROLE`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let claim_defaults = defaults.claim_types;

        Self {
            bind_addr: lookup("TENANTRY_BIND_ADDR").unwrap_or(defaults.bind_addr),
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            claim_types: ClaimTypes {
                user_id: lookup("TENANTRY_CLAIM_USER_ID").unwrap_or(claim_defaults.user_id),
                tenant_id: lookup("TENANTRY_CLAIM_TENANT_ID").unwrap_or(claim_defaults.tenant_id),
                user_name: lookup("TENANTRY_CLAIM_USER_NAME").unwrap_or(claim_defaults.user_name),
                role: lookup("TENANTRY_CLAIM_ROLE").unwrap_or(claim_defaults.role),
            },
            dev_identity: lookup("TENANTRY_DEV_IDENTITY")
                .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true")),
        }
    }
}

//! Tenant resolution.
//!
//! Maps a logical tenant name to a [`TenantConfig`]. Deployments with a
//! tenant directory (database table, control plane, service registry)
//! implement [`TenantResolver`] against it; [`StaticTenantResolver`] covers
//! tests and fixed fleets.

use crate::config::TenantConfig;
use crate::error::TenantError;
use async_trait::async_trait;
use std::collections::HashMap;

/// Tenant resolver trait
///
/// Implement this trait to provide tenant resolution logic.
#[async_trait]
pub trait TenantResolver: Send + Sync {
    /// Resolve a tenant name to its connection config.
    ///
    /// Fails with [`TenantError::NotFound`] for unknown identifiers.
    async fn resolve(&self, tenant: &str) -> Result<TenantConfig, TenantError>;
}

/// Static tenant resolver
///
/// Resolves from a fixed base config plus explicit per-tenant overrides.
/// Names without an override resolve to `base + database = name`; in strict
/// mode they fail with [`TenantError::NotFound`] instead.
pub struct StaticTenantResolver {
    base: TenantConfig,
    overrides: HashMap<String, TenantConfig>,
    strict: bool,
}

impl StaticTenantResolver {
    /// Create a resolver deriving unknown tenants from the base config.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use commutator::{StaticTenantResolver, TenantConfig};
    ///
    /// let base = TenantConfig::new()
    ///     .with_adapter("mysql")
    ///     .with_host("db.internal");
    /// let resolver = StaticTenantResolver::new(base)
    ///     .with_tenant("acme", TenantConfig::new()
    ///         .with_host("dedicated.internal")
    ///         .with_database("acme_prod"));
    /// ```
    pub fn new(base: TenantConfig) -> Self {
        Self {
            base,
            overrides: HashMap::new(),
            strict: false,
        }
    }

    /// Register an explicit config for a tenant name.
    pub fn with_tenant(mut self, name: impl Into<String>, config: TenantConfig) -> Self {
        self.overrides.insert(name.into(), config);
        self
    }

    /// Only explicitly registered tenants resolve; everything else is
    /// [`TenantError::NotFound`].
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }
}

#[async_trait]
impl TenantResolver for StaticTenantResolver {
    async fn resolve(&self, tenant: &str) -> Result<TenantConfig, TenantError> {
        if let Some(config) = self.overrides.get(tenant) {
            return Ok(config.clone());
        }

        if self.strict {
            return Err(TenantError::NotFound(tenant.to_string()));
        }

        Ok(self.base.clone().with_database(tenant))
    }
}

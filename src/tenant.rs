//! Tenant references.

use crate::config::TenantConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What callers hand to the switching engine.
///
/// A named tenant goes through the resolver; an already-resolved config is
/// used as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TenantRef {
    /// Logical tenant name, resolved to a config by the resolver.
    Named(String),
    /// Pre-resolved connection config.
    Config(TenantConfig),
}

impl TenantRef {
    /// Human-readable identifier for logs and error messages.
    ///
    /// For a config ref this is its database name.
    pub fn display_name(&self) -> &str {
        match self {
            TenantRef::Named(name) => name,
            TenantRef::Config(config) => config.database.as_deref().unwrap_or("<unnamed>"),
        }
    }

    /// The pre-resolved config, if this ref carries one.
    pub fn as_config(&self) -> Option<&TenantConfig> {
        match self {
            TenantRef::Named(_) => None,
            TenantRef::Config(config) => Some(config),
        }
    }
}

impl fmt::Display for TenantRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl From<&str> for TenantRef {
    fn from(name: &str) -> Self {
        TenantRef::Named(name.to_string())
    }
}

impl From<String> for TenantRef {
    fn from(name: String) -> Self {
        TenantRef::Named(name)
    }
}

impl From<&String> for TenantRef {
    fn from(name: &String) -> Self {
        TenantRef::Named(name.clone())
    }
}

impl From<TenantConfig> for TenantRef {
    fn from(config: TenantConfig) -> Self {
        TenantRef::Config(config)
    }
}

//! Tenant connection configuration and diffing.
//!
//! A [`TenantConfig`] describes one physical connection target. Configs are
//! immutable once resolved for a switch and are compared field by field to
//! produce a [`Difference`], the decision input for strategy selection.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Connection attributes for a single tenant target.
///
/// Only `database` is required in practice; everything else is optional and
/// driver-specific options that have no typed field go into `options`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TenantConfig {
    /// Driver adapter name (e.g. `mysql`).
    #[serde(default)]
    pub adapter: Option<String>,

    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub database: Option<String>,

    /// PostgreSQL-style schema search path; unused by MySQL targets.
    #[serde(default)]
    pub schema_search_path: Option<String>,

    /// Full connection URL, used in place of host/port when present.
    #[serde(default)]
    pub url: Option<String>,

    /// Driver-specific options without a typed field.
    #[serde(default)]
    pub options: BTreeMap<String, serde_json::Value>,
}

impl TenantConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the adapter name.
    pub fn with_adapter(mut self, adapter: impl Into<String>) -> Self {
        self.adapter = Some(adapter.into());
        self
    }

    /// Set the host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the username.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the database name.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Set the schema search path.
    pub fn with_schema_search_path(mut self, path: impl Into<String>) -> Self {
        self.schema_search_path = Some(path.into());
        self
    }

    /// Set the connection URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set a driver-specific option.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Clone of this config with the given fields cleared.
    ///
    /// Used when connecting to a host without yet targeting a database
    /// (tenant creation strips database and schema search path, tenant drop
    /// strips database only).
    pub fn without(&self, fields: &[ConfigField]) -> TenantConfig {
        let mut scoped = self.clone();
        for field in fields {
            match field {
                ConfigField::Adapter => scoped.adapter = None,
                ConfigField::Host => scoped.host = None,
                ConfigField::Port => scoped.port = None,
                ConfigField::Username => scoped.username = None,
                ConfigField::Password => scoped.password = None,
                ConfigField::Database => scoped.database = None,
                ConfigField::SchemaSearchPath => scoped.schema_search_path = None,
                ConfigField::Url => scoped.url = None,
                ConfigField::Option(key) => {
                    scoped.options.remove(key);
                }
            }
        }
        scoped
    }

    /// Whether this config still names something a "use database" statement
    /// can target.
    pub fn targets_database(&self) -> bool {
        self.database.is_some() || self.schema_search_path.is_some()
    }
}

/// One comparable field of a [`TenantConfig`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigField {
    Adapter,
    Host,
    Port,
    Username,
    Password,
    Database,
    SchemaSearchPath,
    Url,
    /// A key in the driver-specific options map.
    Option(String),
}

/// The set of fields whose requested value differs from the current config.
///
/// Only fields present in the requested config participate: a field the
/// target leaves unset is not a change, matching how switching decides
/// whether the currently bound pool can be reused. With no current config,
/// every present field of the target counts as changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Difference {
    changed: BTreeSet<ConfigField>,
}

impl Difference {
    /// Compare a requested config against the current one.
    pub fn between(current: Option<&TenantConfig>, requested: &TenantConfig) -> Self {
        let mut changed = BTreeSet::new();

        fn differs<T, F>(current: Option<&TenantConfig>, requested: &Option<T>, field: F) -> bool
        where
            T: PartialEq,
            F: Fn(&TenantConfig) -> &Option<T>,
        {
            requested.is_some() && current.map(field) != Some(requested)
        }

        if differs(current, &requested.adapter, |c| &c.adapter) {
            changed.insert(ConfigField::Adapter);
        }
        if differs(current, &requested.host, |c| &c.host) {
            changed.insert(ConfigField::Host);
        }
        if differs(current, &requested.port, |c| &c.port) {
            changed.insert(ConfigField::Port);
        }
        if differs(current, &requested.username, |c| &c.username) {
            changed.insert(ConfigField::Username);
        }
        if differs(current, &requested.password, |c| &c.password) {
            changed.insert(ConfigField::Password);
        }
        if differs(current, &requested.database, |c| &c.database) {
            changed.insert(ConfigField::Database);
        }
        if differs(current, &requested.schema_search_path, |c| &c.schema_search_path) {
            changed.insert(ConfigField::SchemaSearchPath);
        }
        if differs(current, &requested.url, |c| &c.url) {
            changed.insert(ConfigField::Url);
        }

        for (key, value) in &requested.options {
            let same = current
                .map(|c| c.options.get(key) == Some(value))
                .unwrap_or(false);
            if !same {
                changed.insert(ConfigField::Option(key.clone()));
            }
        }

        Self { changed }
    }

    /// Whether the given field changed.
    pub fn contains(&self, field: &ConfigField) -> bool {
        self.changed.contains(field)
    }

    /// Whether the physical host identity changed (host or URL).
    ///
    /// This is the only trigger for a full reconnect; any other change is
    /// satisfied by a lightweight "use database".
    pub fn host_changed(&self) -> bool {
        self.changed.contains(&ConfigField::Host) || self.changed.contains(&ConfigField::Url)
    }

    /// Whether nothing changed.
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }

    /// Number of changed fields.
    pub fn len(&self) -> usize {
        self.changed.len()
    }

    /// Iterate the changed fields in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = &ConfigField> {
        self.changed.iter()
    }
}

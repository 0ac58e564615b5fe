//! Error types for tenant switching and lifecycle operations.

use thiserror::Error;

/// Errors surfaced by the switching engine.
#[derive(Error, Debug)]
pub enum TenantError {
    /// Tenant identifier unresolvable, or target database absent.
    #[error("Tenant not found: {0}")]
    NotFound(String),

    /// Identifier failed validation before any physical operation.
    #[error("Invalid tenant identifier: {0}")]
    InvalidIdentifier(String),

    /// Driver call failed for a reason other than absence, surfaced after
    /// one reconnect-and-retry.
    #[error("Switch failed for {target}: {source}")]
    SwitchFailure {
        target: String,
        #[source]
        source: DriverError,
    },

    /// Failure during create's database/schema/seed steps, surfaced after
    /// best-effort restoration of the previous tenant.
    #[error("Provisioning failed for tenant {tenant}: {reason}")]
    ProvisioningFailure { tenant: String, reason: String },
}

/// Result type alias for tenant operations.
pub type TenantResult<T> = Result<T, TenantError>;

/// Errors surfaced by the database driver.
#[derive(Error, Debug)]
pub enum DriverError {
    /// The named database does not exist on the server.
    #[error("Unknown database: {0}")]
    UnknownDatabase(String),

    /// Connection or pool establishment failure.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Statement execution failure.
    #[error("Statement error: {0}")]
    Statement(String),
}

/// Errors from schema/seed loaders for files that exist but cannot be
/// loaded. A missing file path is a panic, not a `LoaderError`.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Statement failed while loading {path}: {source}")]
    Execution {
        path: String,
        #[source]
        source: DriverError,
    },
}

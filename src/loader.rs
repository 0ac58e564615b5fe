//! Schema and seed file loading.
//!
//! After provisioning a tenant, the engine loads a base schema file (and
//! optionally a seed file) into the freshly created database. Loading a
//! path that does not exist panics: continuing without the base schema
//! would leave the tenant unusable, so this is a hard stop rather than a
//! recoverable error.

use crate::driver::DatabaseDriver;
use crate::error::LoaderError;
use async_trait::async_trait;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Loads a schema or seed file into the currently active tenant.
#[async_trait]
pub trait SchemaLoader<D: DatabaseDriver>: Send + Sync {
    /// Execute the file's contents against the given pool.
    ///
    /// # Panics
    ///
    /// Panics if `path` does not exist.
    async fn load(&self, driver: &D, pool: &D::Pool, path: &Path) -> Result<(), LoaderError>;
}

/// Loader for plain `.sql` files.
///
/// Splits the file on `;`, skips blank statements and `--` comment lines,
/// and executes each remaining statement through the driver in order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlFileLoader;

impl SqlFileLoader {
    /// Create a new SQL file loader.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl<D: DatabaseDriver> SchemaLoader<D> for SqlFileLoader {
    async fn load(&self, driver: &D, pool: &D::Pool, path: &Path) -> Result<(), LoaderError> {
        if !path.exists() {
            panic!("{} doesn't exist yet", path.display());
        }

        let contents = fs::read_to_string(path)
            .await
            .map_err(|e| LoaderError::Read {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let mut executed = 0usize;
        for raw in contents.split(';') {
            let statement = raw
                .lines()
                .filter(|line| !line.trim_start().starts_with("--"))
                .collect::<Vec<_>>()
                .join("\n");
            let statement = statement.trim();

            if statement.is_empty() {
                continue;
            }

            driver
                .execute(pool, statement)
                .await
                .map_err(|source| LoaderError::Execution {
                    path: path.display().to_string(),
                    source,
                })?;
            executed += 1;
        }

        debug!(
            "Executed {} statement(s) from {}",
            executed,
            path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TenantConfig;
    use crate::error::DriverError;
    use parking_lot::Mutex;
    use std::io::Write;

    #[derive(Default)]
    struct RecordingDriver {
        statements: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    #[async_trait]
    impl DatabaseDriver for RecordingDriver {
        type Pool = ();

        async fn establish_pool(
            &self,
            _config: &TenantConfig,
            _owner_name: &str,
        ) -> Result<Self::Pool, DriverError> {
            Ok(())
        }

        async fn execute(&self, _pool: &Self::Pool, statement: &str) -> Result<(), DriverError> {
            if let Some(marker) = self.fail_on
                && statement.contains(marker)
            {
                return Err(DriverError::Statement(format!("bad statement: {marker}")));
            }
            self.statements.lock().push(statement.to_string());
            Ok(())
        }

        async fn create_database(
            &self,
            _pool: &Self::Pool,
            _database: &str,
            _config: &TenantConfig,
        ) -> Result<(), DriverError> {
            Ok(())
        }

        async fn drop_database(
            &self,
            _pool: &Self::Pool,
            _database: &str,
        ) -> Result<(), DriverError> {
            Ok(())
        }

        async fn database_exists(
            &self,
            _pool: &Self::Pool,
            _database: &str,
        ) -> Result<bool, DriverError> {
            Ok(true)
        }
    }

    fn write_sql(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.sql");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        (dir, path)
    }

    #[tokio::test]
    async fn test_load_splits_statements_and_skips_comments() {
        let (_dir, path) = write_sql(
            "-- base schema\n\
             CREATE TABLE users (id INT);\n\
             \n\
             -- lookup data\n\
             CREATE TABLE plans (\n  id INT\n);\n\
             INSERT INTO plans VALUES (1);\n",
        );

        let driver = RecordingDriver::default();
        let loader = SqlFileLoader::new();
        loader.load(&driver, &(), &path).await.unwrap();

        let statements = driver.statements.lock();
        assert_eq!(statements.len(), 3);
        assert_eq!(statements[0], "CREATE TABLE users (id INT)");
        assert!(statements[1].starts_with("CREATE TABLE plans"));
        assert_eq!(statements[2], "INSERT INTO plans VALUES (1)");
    }

    #[tokio::test]
    async fn test_load_surfaces_statement_failures() {
        let (_dir, path) = write_sql("CREATE TABLE a (id INT);\nDROP EVERYTHING;\n");

        let driver = RecordingDriver {
            fail_on: Some("DROP EVERYTHING"),
            ..Default::default()
        };
        let loader = SqlFileLoader::new();
        let err = loader.load(&driver, &(), &path).await.unwrap_err();

        assert!(matches!(err, LoaderError::Execution { .. }));
        assert_eq!(driver.statements.lock().len(), 1);
    }

    #[tokio::test]
    #[should_panic(expected = "doesn't exist yet")]
    async fn test_load_panics_on_missing_file() {
        let driver = RecordingDriver::default();
        let loader = SqlFileLoader::new();
        let missing = std::path::Path::new("/nonexistent/schema.sql");
        let _ = loader.load(&driver, &(), missing).await;
    }
}

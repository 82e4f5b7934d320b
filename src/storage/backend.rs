//! Backend selection
//!
//! Probes for a usable SQLite database at startup and degrades to
//! fallback-only mode when it cannot be opened. Selection never fails:
//! a failed probe is logged at warn and the app keeps running on the
//! key-value store alone.

use std::path::Path;

use rusqlite::Connection;

use super::schema;
use crate::Result;
use crate::config::ProfileConfig;

/// The persistence capability detected at startup.
pub enum Backend {
    /// Embedded SQLite is available; preferred for reads
    Relational(Connection),
    /// No relational engine; the key-value fallback serves reads too
    FallbackOnly,
}

impl Backend {
    /// Probe for a relational backend per the configuration.
    ///
    /// Returns `FallbackOnly` when the configuration disables the
    /// relational engine, or when opening the database or applying the
    /// schema fails. Callers never see the probe error.
    pub fn select(config: &ProfileConfig) -> Self {
        if !config.wants_relational() {
            tracing::debug!("relational backend disabled by configuration");
            return Backend::FallbackOnly;
        }

        let path = config.database_path();
        match Self::open_relational(&path) {
            Ok(conn) => {
                tracing::debug!("relational backend ready at {}", path.display());
                Backend::Relational(conn)
            }
            Err(e) => {
                tracing::warn!(
                    "relational backend unavailable ({e}), continuing with fallback store only"
                );
                Backend::FallbackOnly
            }
        }
    }

    /// Open an in-memory relational backend (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::prepare(&conn)?;
        Ok(Backend::Relational(conn))
    }

    fn open_relational(path: &Path) -> Result<Connection> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Self::prepare(&conn)?;
        Ok(conn)
    }

    // Cascades need foreign_keys on; SQLite defaults it off per connection.
    fn prepare(conn: &Connection) -> Result<()> {
        conn.pragma_update(None, "foreign_keys", true)?;
        schema::ensure_schema(conn)?;
        Ok(())
    }

    /// The open connection, when the relational backend is present
    pub fn connection(&self) -> Option<&Connection> {
        match self {
            Backend::Relational(conn) => Some(conn),
            Backend::FallbackOnly => None,
        }
    }

    /// Whether the relational backend is present
    pub fn is_relational(&self) -> bool {
        matches!(self, Backend::Relational(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_database(path: &Path) -> ProfileConfig {
        ProfileConfig {
            database: Some(path.to_string_lossy().to_string()),
            data_dir: None,
            relational: None,
        }
    }

    #[test]
    fn test_select_opens_database_and_schema() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("perfil.db");
        let backend = Backend::select(&config_with_database(&db_path));

        assert!(backend.is_relational());
        assert!(db_path.exists());

        let conn = backend.connection().unwrap();
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'sesion_data'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 1);
    }

    #[test]
    fn test_select_enables_foreign_keys() {
        let backend = Backend::in_memory().unwrap();
        let conn = backend.connection().unwrap();
        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn test_unopenable_database_degrades_silently() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        // Parent path is a plain file, so the database cannot be created
        let db_path = blocker.join("perfil.db");
        let backend = Backend::select(&config_with_database(&db_path));
        assert!(!backend.is_relational());
    }

    #[test]
    fn test_config_can_disable_relational() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("perfil.db");
        let mut config = config_with_database(&db_path);
        config.relational = Some(false);

        let backend = Backend::select(&config);
        assert!(!backend.is_relational());
        assert!(!db_path.exists());
    }
}

//! Database schema definitions
//!
//! Table and column names match what earlier releases of the app
//! created, so existing database files keep working. The per-user
//! tables carry the owner key with `ON DELETE CASCADE`; cascades only
//! fire when the connection has `PRAGMA foreign_keys = ON`.

use rusqlite::Connection;

use crate::Result;

/// SQL to create the session table
pub const CREATE_SESSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS sesion_data (
    user_name TEXT PRIMARY KEY NOT NULL,
    password TEXT NOT NULL,
    active INTEGER NOT NULL DEFAULT 0
)
"#;

/// SQL to create the personal data table (one row per user)
pub const CREATE_PERSONAL_DATA_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS datos_personales (
    user_name TEXT PRIMARY KEY NOT NULL
        REFERENCES sesion_data(user_name) ON DELETE CASCADE,
    nombre TEXT NOT NULL,
    apellido TEXT NOT NULL,
    educacion TEXT NOT NULL,
    fnac TEXT NOT NULL
)
"#;

/// SQL to create the work experience table
pub const CREATE_EXPERIENCE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS experiencia (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_name TEXT NOT NULL
        REFERENCES sesion_data(user_name) ON DELETE CASCADE,
    empresa TEXT NOT NULL,
    inicio INTEGER NOT NULL,
    actual INTEGER NOT NULL DEFAULT 0,
    termino INTEGER,
    cargo TEXT NOT NULL
)
"#;

/// SQL to create the certifications table
pub const CREATE_CERTIFICATIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS certificados (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_name TEXT NOT NULL
        REFERENCES sesion_data(user_name) ON DELETE CASCADE,
    nombre TEXT NOT NULL,
    fecha TEXT NOT NULL,
    vence INTEGER NOT NULL DEFAULT 0,
    vencimiento TEXT
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_experiencia_user ON experiencia(user_name)",
    "CREATE INDEX IF NOT EXISTS idx_certificados_user ON certificados(user_name)",
    "CREATE INDEX IF NOT EXISTS idx_sesion_active ON sesion_data(active)",
];

/// All schema creation statements, in FK dependency order
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_SESSION_TABLE,
        CREATE_PERSONAL_DATA_TABLE,
        CREATE_EXPERIENCE_TABLE,
        CREATE_CERTIFICATIONS_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}

/// Apply the full schema to a connection. Safe to call on every start.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    for stmt in all_schema_statements() {
        conn.execute(stmt, [])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN
                 ('sesion_data', 'datos_personales', 'experiencia', 'certificados')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 4);
    }

    #[test]
    fn test_schema_survives_reapply_with_data() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO sesion_data (user_name, password, active) VALUES ('ana', '1234', 1)",
            [],
        )
        .unwrap();

        ensure_schema(&conn).unwrap();
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM sesion_data", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }
}

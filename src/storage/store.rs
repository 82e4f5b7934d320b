//! Profile store - the dual-write persistence core
//!
//! Mutations attempt the relational write first (when the handle
//! exists) and then unconditionally write the fallback store; reads
//! prefer the relational result. Record operations scope to the
//! current user and return neutral results when nobody is registered.

use std::path::PathBuf;

use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};

use super::backend::Backend;
use super::fallback::{self, FallbackStore};
use crate::Result;
use crate::config::ProfileConfig;
use crate::model::{
    CertificationEntry, CertificationPatch, ExperienceEntry, ExperiencePatch, PersonalData,
    Session,
};

/// Dual-backend store for sessions, personal data, experience and
/// certification records.
pub struct ProfileStore {
    backend: Backend,
    fallback: FallbackStore,
}

impl ProfileStore {
    /// Open the store per the configuration: the fallback store
    /// unconditionally, then the relational backend if its probe
    /// succeeds.
    pub fn open(config: &ProfileConfig) -> Result<Self> {
        let fallback = FallbackStore::open(config.data_dir_path())?;
        let backend = Backend::select(config);
        Ok(Self { backend, fallback })
    }

    /// Open with an explicit backend (for testing and forced fallback mode)
    pub fn with_backend(backend: Backend, data_dir: impl Into<PathBuf>) -> Result<Self> {
        let fallback = FallbackStore::open(data_dir)?;
        Ok(Self { backend, fallback })
    }

    /// Whether the relational backend survived the startup probe
    pub fn is_relational(&self) -> bool {
        self.backend.is_relational()
    }

    // ========== Session Operations ==========

    /// Whether some user is currently signed in
    pub fn has_active_session(&self) -> Result<bool> {
        if let Some(session) = self.fallback.get::<Session>(fallback::SESSION_KEY)? {
            if session.active {
                return Ok(true);
            }
        }
        if let Some(conn) = self.backend.connection() {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM sesion_data WHERE active = 1",
                [],
                |row| row.get(0),
            )?;
            return Ok(count > 0);
        }
        Ok(false)
    }

    /// Check a username/PIN pair against the stored credentials
    pub fn validate_credentials(&self, user: &str, pin: &str) -> Result<bool> {
        if let Some(conn) = self.backend.connection() {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM sesion_data WHERE user_name = ?1 AND password = ?2",
                params![user, pin],
                |row| row.get(0),
            )?;
            return Ok(count > 0);
        }
        match self.fallback.get::<Session>(fallback::SESSION_KEY)? {
            Some(session) => Ok(session.user == user && session.pin == pin),
            None => Ok(false),
        }
    }

    /// Register (or re-register) a profile and sign it in
    pub fn register_session(&self, user: &str, pin: &str) -> Result<()> {
        if let Some(conn) = self.backend.connection() {
            conn.execute(
                "INSERT OR REPLACE INTO sesion_data (user_name, password, active) VALUES (?1, ?2, 1)",
                params![user, pin],
            )?;
        }
        self.fallback
            .set(fallback::SESSION_KEY, &Session::new(user, pin, true))?;
        tracing::debug!("registered session for {user}");
        Ok(())
    }

    /// Flip the active flag for a user.
    ///
    /// The fallback session document is read-modify-written so the
    /// stored pin survives sign-out/sign-in cycles; it only resets when
    /// the document named a different user.
    pub fn set_session_active(&self, user: &str, active: bool) -> Result<()> {
        if let Some(conn) = self.backend.connection() {
            conn.execute(
                "UPDATE sesion_data SET active = ?1 WHERE user_name = ?2",
                params![active, user],
            )?;
        }

        let mut session = self
            .fallback
            .get::<Session>(fallback::SESSION_KEY)?
            .filter(|session| session.user == user)
            .unwrap_or_else(|| Session::new(user, "", false));
        session.active = active;
        self.fallback.set(fallback::SESSION_KEY, &session)?;
        Ok(())
    }

    /// Username all per-user operations scope by: the fallback session
    /// document's user, whether or not it is active
    pub fn current_username(&self) -> Result<Option<String>> {
        Ok(self
            .fallback
            .get::<Session>(fallback::SESSION_KEY)?
            .map(|session| session.user))
    }

    /// Drop the stored session document (logout with no known user)
    pub fn clear_session(&self) -> Result<()> {
        self.fallback.remove(fallback::SESSION_KEY)
    }

    /// Remove a profile and everything it owns, in both backends
    pub fn delete_user(&self, user: &str) -> Result<()> {
        if let Some(conn) = self.backend.connection() {
            // FK cascades clear the user's record tables
            conn.execute("DELETE FROM sesion_data WHERE user_name = ?1", params![user])?;
        }
        self.fallback.remove(&fallback::personal_data_key(user))?;
        self.fallback.remove(&fallback::experience_key(user))?;
        self.fallback.remove(&fallback::certification_key(user))?;
        if let Some(session) = self.fallback.get::<Session>(fallback::SESSION_KEY)? {
            if session.user == user {
                self.fallback.remove(fallback::SESSION_KEY)?;
            }
        }
        tracing::debug!("deleted profile {user}");
        Ok(())
    }

    // ========== Personal Data Operations ==========

    /// Upsert the current user's personal data in both backends
    pub fn save_personal_data(&self, data: &PersonalData) -> Result<()> {
        let Some(user) = self.current_username()? else {
            tracing::debug!("no registered user, personal data not saved");
            return Ok(());
        };

        if let Some(conn) = self.backend.connection() {
            conn.execute(
                r#"
                INSERT OR REPLACE INTO datos_personales (user_name, nombre, apellido, educacion, fnac)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    user,
                    data.first_name,
                    data.last_name,
                    data.education_level,
                    data.birth_date,
                ],
            )?;
        }
        self.fallback.set(&fallback::personal_data_key(&user), data)?;
        Ok(())
    }

    /// The current user's personal data. Prefers the relational row,
    /// falling back to the stored document on a miss.
    pub fn personal_data(&self) -> Result<Option<PersonalData>> {
        let Some(user) = self.current_username()? else {
            return Ok(None);
        };

        if let Some(conn) = self.backend.connection() {
            let row = conn
                .query_row(
                    "SELECT nombre, apellido, educacion, fnac FROM datos_personales WHERE user_name = ?1",
                    params![user],
                    |row| {
                        Ok(PersonalData {
                            first_name: row.get(0)?,
                            last_name: row.get(1)?,
                            education_level: row.get(2)?,
                            birth_date: row.get(3)?,
                        })
                    },
                )
                .optional()?;
            if row.is_some() {
                return Ok(row);
            }
        }
        self.fallback.get(&fallback::personal_data_key(&user))
    }

    // ========== Experience Operations ==========

    /// Add an experience record for the current user. Returns the
    /// assigned id, or `None` when nobody is registered.
    pub fn add_experience(&self, entry: &ExperienceEntry) -> Result<Option<i64>> {
        let Some(user) = self.current_username()? else {
            tracing::debug!("no registered user, experience entry not saved");
            return Ok(None);
        };

        let relational_id = match self.backend.connection() {
            Some(conn) => {
                conn.execute(
                    r#"
                    INSERT INTO experiencia (user_name, empresa, inicio, actual, termino, cargo)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    "#,
                    params![
                        user,
                        entry.company,
                        entry.start_year,
                        entry.current,
                        entry.end_year,
                        entry.role,
                    ],
                )?;
                Some(conn.last_insert_rowid())
            }
            None => None,
        };

        let key = fallback::experience_key(&user);
        let mut list: Vec<ExperienceEntry> = self.fallback.get(&key)?.unwrap_or_default();
        let id = relational_id.unwrap_or_else(|| next_fallback_id(list.iter().map(|e| e.id)));
        let mut stored = entry.clone();
        stored.id = id;
        list.insert(0, stored);
        self.fallback.set(&key, &list)?;

        Ok(Some(id))
    }

    /// The current user's experience records, newest first
    pub fn list_experience(&self) -> Result<Vec<ExperienceEntry>> {
        let Some(user) = self.current_username()? else {
            return Ok(Vec::new());
        };

        if let Some(conn) = self.backend.connection() {
            let mut stmt = conn.prepare(
                "SELECT id, empresa, inicio, actual, termino, cargo FROM experiencia
                 WHERE user_name = ?1 ORDER BY id DESC",
            )?;
            let entries = stmt
                .query_map(params![user], |row| self.row_to_experience(row))?
                .filter_map(|r| r.ok())
                .collect();
            return Ok(entries);
        }

        Ok(self
            .fallback
            .get(&fallback::experience_key(&user))?
            .unwrap_or_default())
    }

    /// Apply a sparse update to one of the current user's experience
    /// records. An empty patch issues no statement.
    pub fn update_experience(&self, id: i64, patch: &ExperiencePatch) -> Result<bool> {
        if patch.is_empty() {
            return Ok(false);
        }
        let Some(user) = self.current_username()? else {
            return Ok(false);
        };

        let mut changed = false;
        if let Some(conn) = self.backend.connection() {
            let (columns, mut values) = patch.set_clauses();
            let sql = format!(
                "UPDATE experiencia SET {} WHERE id = ? AND user_name = ?",
                columns.join(", ")
            );
            values.push(Value::from(id));
            values.push(Value::from(user.clone()));
            changed |= conn.execute(&sql, params_from_iter(values))? > 0;
        }

        let key = fallback::experience_key(&user);
        if let Some(mut list) = self.fallback.get::<Vec<ExperienceEntry>>(&key)? {
            if let Some(pos) = list.iter().position(|entry| entry.id == id) {
                patch.apply(&mut list[pos]);
                self.fallback.set(&key, &list)?;
                changed = true;
            }
        }
        Ok(changed)
    }

    /// Remove one of the current user's experience records
    pub fn remove_experience(&self, id: i64) -> Result<bool> {
        let Some(user) = self.current_username()? else {
            return Ok(false);
        };

        let mut changed = false;
        if let Some(conn) = self.backend.connection() {
            let removed = conn.execute(
                "DELETE FROM experiencia WHERE id = ?1 AND user_name = ?2",
                params![id, user],
            )?;
            changed |= removed > 0;
        }

        let key = fallback::experience_key(&user);
        if let Some(mut list) = self.fallback.get::<Vec<ExperienceEntry>>(&key)? {
            let before = list.len();
            list.retain(|entry| entry.id != id);
            if list.len() != before {
                self.fallback.set(&key, &list)?;
                changed = true;
            }
        }
        Ok(changed)
    }

    /// Helper to convert a row to an ExperienceEntry
    fn row_to_experience(&self, row: &rusqlite::Row) -> rusqlite::Result<ExperienceEntry> {
        Ok(ExperienceEntry {
            id: row.get(0)?,
            company: row.get(1)?,
            start_year: row.get(2)?,
            current: row.get(3)?,
            end_year: row.get(4)?,
            role: row.get(5)?,
        })
    }

    // ========== Certification Operations ==========

    /// Add a certification for the current user. Returns the assigned
    /// id, or `None` when nobody is registered.
    pub fn add_certification(&self, entry: &CertificationEntry) -> Result<Option<i64>> {
        let Some(user) = self.current_username()? else {
            tracing::debug!("no registered user, certification not saved");
            return Ok(None);
        };

        let relational_id = match self.backend.connection() {
            Some(conn) => {
                conn.execute(
                    r#"
                    INSERT INTO certificados (user_name, nombre, fecha, vence, vencimiento)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    "#,
                    params![
                        user,
                        entry.name,
                        entry.obtained_on,
                        entry.expires,
                        entry.expires_on,
                    ],
                )?;
                Some(conn.last_insert_rowid())
            }
            None => None,
        };

        let key = fallback::certification_key(&user);
        let mut list: Vec<CertificationEntry> = self.fallback.get(&key)?.unwrap_or_default();
        let id = relational_id.unwrap_or_else(|| next_fallback_id(list.iter().map(|e| e.id)));
        let mut stored = entry.clone();
        stored.id = id;
        list.insert(0, stored);
        self.fallback.set(&key, &list)?;

        Ok(Some(id))
    }

    /// The current user's certifications, newest first
    pub fn list_certifications(&self) -> Result<Vec<CertificationEntry>> {
        let Some(user) = self.current_username()? else {
            return Ok(Vec::new());
        };

        if let Some(conn) = self.backend.connection() {
            let mut stmt = conn.prepare(
                "SELECT id, nombre, fecha, vence, vencimiento FROM certificados
                 WHERE user_name = ?1 ORDER BY id DESC",
            )?;
            let entries = stmt
                .query_map(params![user], |row| self.row_to_certification(row))?
                .filter_map(|r| r.ok())
                .collect();
            return Ok(entries);
        }

        Ok(self
            .fallback
            .get(&fallback::certification_key(&user))?
            .unwrap_or_default())
    }

    /// Apply a sparse update to one of the current user's
    /// certifications. An empty patch issues no statement.
    pub fn update_certification(&self, id: i64, patch: &CertificationPatch) -> Result<bool> {
        if patch.is_empty() {
            return Ok(false);
        }
        let Some(user) = self.current_username()? else {
            return Ok(false);
        };

        let mut changed = false;
        if let Some(conn) = self.backend.connection() {
            let (columns, mut values) = patch.set_clauses();
            let sql = format!(
                "UPDATE certificados SET {} WHERE id = ? AND user_name = ?",
                columns.join(", ")
            );
            values.push(Value::from(id));
            values.push(Value::from(user.clone()));
            changed |= conn.execute(&sql, params_from_iter(values))? > 0;
        }

        let key = fallback::certification_key(&user);
        if let Some(mut list) = self.fallback.get::<Vec<CertificationEntry>>(&key)? {
            if let Some(pos) = list.iter().position(|entry| entry.id == id) {
                patch.apply(&mut list[pos]);
                self.fallback.set(&key, &list)?;
                changed = true;
            }
        }
        Ok(changed)
    }

    /// Remove one of the current user's certifications
    pub fn remove_certification(&self, id: i64) -> Result<bool> {
        let Some(user) = self.current_username()? else {
            return Ok(false);
        };

        let mut changed = false;
        if let Some(conn) = self.backend.connection() {
            let removed = conn.execute(
                "DELETE FROM certificados WHERE id = ?1 AND user_name = ?2",
                params![id, user],
            )?;
            changed |= removed > 0;
        }

        let key = fallback::certification_key(&user);
        if let Some(mut list) = self.fallback.get::<Vec<CertificationEntry>>(&key)? {
            let before = list.len();
            list.retain(|entry| entry.id != id);
            if list.len() != before {
                self.fallback.set(&key, &list)?;
                changed = true;
            }
        }
        Ok(changed)
    }

    /// Helper to convert a row to a CertificationEntry
    fn row_to_certification(&self, row: &rusqlite::Row) -> rusqlite::Result<CertificationEntry> {
        Ok(CertificationEntry {
            id: row.get(0)?,
            name: row.get(1)?,
            obtained_on: row.get(2)?,
            expires: row.get(3)?,
            expires_on: row.get(4)?,
        })
    }

    // ========== Maintenance Operations ==========

    /// Storage statistics across both backends
    pub fn stats(&self) -> Result<StoreStats> {
        let (sessions, personal, experience, certifications) = match self.backend.connection() {
            Some(conn) => (
                self.count_rows(conn, "sesion_data")?,
                self.count_rows(conn, "datos_personales")?,
                self.count_rows(conn, "experiencia")?,
                self.count_rows(conn, "certificados")?,
            ),
            None => self.fallback_counts()?,
        };

        Ok(StoreStats {
            relational: self.backend.is_relational(),
            sessions,
            personal,
            experience,
            certifications,
            fallback_documents: self.fallback.document_count()?,
        })
    }

    fn count_rows(&self, conn: &Connection, table: &'static str) -> Result<usize> {
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // Without a relational backend, counts come from the stored documents
    fn fallback_counts(&self) -> Result<(usize, usize, usize, usize)> {
        let mut sessions = 0;
        let mut personal = 0;
        let mut experience = 0;
        let mut certifications = 0;

        for entry in std::fs::read_dir(self.fallback.dir())? {
            let name = entry?.file_name();
            let Some(key) = name.to_str().and_then(|n| n.strip_suffix(".json")) else {
                continue;
            };
            if key == fallback::SESSION_KEY {
                sessions += 1;
            } else if key.starts_with("datos_personales_") {
                personal += 1;
            } else if key.starts_with("exp_") {
                let list: Vec<ExperienceEntry> = self.fallback.get(key)?.unwrap_or_default();
                experience += list.len();
            } else if key.starts_with("cert_") {
                let list: Vec<CertificationEntry> = self.fallback.get(key)?.unwrap_or_default();
                certifications += list.len();
            }
        }
        Ok((sessions, personal, experience, certifications))
    }
}

/// Next surrogate id when only the fallback store assigns them
fn next_fallback_id(ids: impl Iterator<Item = i64>) -> i64 {
    ids.max().unwrap_or(0) + 1
}

/// Storage statistics
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub relational: bool,
    pub sessions: usize,
    pub personal: usize,
    pub experience: usize,
    pub certifications: usize,
    pub fallback_documents: usize,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let backend = if self.relational {
            "relational + fallback"
        } else {
            "fallback only"
        };
        writeln!(f, "Storage Statistics:")?;
        writeln!(f, "  Backend: {}", backend)?;
        writeln!(f, "  Sessions: {}", self.sessions)?;
        writeln!(f, "  Personal records: {}", self.personal)?;
        writeln!(f, "  Experience records: {}", self.experience)?;
        writeln!(f, "  Certifications: {}", self.certifications)?;
        writeln!(f, "  Fallback documents: {}", self.fallback_documents)
    }
}

//! Domain records for the profile store
//!
//! Rust field names are English; the serde renames keep the JSON key
//! names earlier releases of the app wrote to the fallback store, so
//! existing data files stay readable. The SQL schema keeps the matching
//! column names for the same reason.

use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

/// A login session: the profile registered on this device and whether
/// its owner is currently signed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Account name, 3-8 alphanumeric characters
    pub user: String,
    /// Four-digit PIN, kept as text so leading zeros survive.
    /// Data written before the PIN was stored omits this key.
    #[serde(rename = "password", default)]
    pub pin: String,
    /// Whether the owner is currently signed in
    pub active: bool,
}

impl Session {
    pub fn new(user: impl Into<String>, pin: impl Into<String>, active: bool) -> Self {
        Self {
            user: user.into(),
            pin: pin.into(),
            active,
        }
    }
}

/// Personal details, one record per user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalData {
    #[serde(rename = "nombre")]
    pub first_name: String,
    #[serde(rename = "apellido")]
    pub last_name: String,
    #[serde(rename = "educacion")]
    pub education_level: String,
    /// Birth date as an ISO-8601 string; the store treats it as opaque
    #[serde(rename = "fnac")]
    pub birth_date: String,
}

impl PersonalData {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        education_level: impl Into<String>,
        birth_date: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            education_level: education_level.into(),
            birth_date: birth_date.into(),
        }
    }
}

/// A work experience record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    /// Surrogate id assigned by storage. Entries written by old app
    /// versions carry no id and deserialize as 0.
    #[serde(default)]
    pub id: i64,
    #[serde(rename = "empresa")]
    pub company: String,
    #[serde(rename = "inicio")]
    pub start_year: i32,
    /// Whether this is the current position
    #[serde(rename = "actual")]
    pub current: bool,
    /// Year the position ended; unset while `current`
    #[serde(rename = "termino")]
    pub end_year: Option<i32>,
    #[serde(rename = "cargo")]
    pub role: String,
}

impl ExperienceEntry {
    /// Create an entry for insertion (id will be set by storage)
    pub fn new(
        company: impl Into<String>,
        start_year: i32,
        current: bool,
        end_year: Option<i32>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            id: 0, // Set by storage
            company: company.into(),
            start_year,
            current,
            end_year,
            role: role.into(),
        }
    }
}

/// A certification record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificationEntry {
    /// Surrogate id assigned by storage. Entries written by old app
    /// versions carry no id and deserialize as 0.
    #[serde(default)]
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
    /// Date the certification was obtained, as an ISO-8601 string
    #[serde(rename = "fecha")]
    pub obtained_on: String,
    /// Whether the certification expires at all
    #[serde(rename = "vence")]
    pub expires: bool,
    /// Expiration date; only meaningful while `expires`
    #[serde(rename = "vencimiento")]
    pub expires_on: Option<String>,
}

impl CertificationEntry {
    /// Create an entry for insertion (id will be set by storage)
    pub fn new(
        name: impl Into<String>,
        obtained_on: impl Into<String>,
        expires: bool,
        expires_on: Option<String>,
    ) -> Self {
        Self {
            id: 0, // Set by storage
            name: name.into(),
            obtained_on: obtained_on.into(),
            expires,
            expires_on,
        }
    }
}

/// Sparse update for an experience record.
///
/// `None` leaves a field untouched. The nullable column patches as
/// `Option<Option<_>>` so "set to NULL" and "leave alone" stay
/// distinct.
#[derive(Debug, Clone, Default)]
pub struct ExperiencePatch {
    pub company: Option<String>,
    pub start_year: Option<i32>,
    pub current: Option<bool>,
    pub end_year: Option<Option<i32>>,
    pub role: Option<String>,
}

impl ExperiencePatch {
    /// True when no field is supplied; such a patch issues no statement
    pub fn is_empty(&self) -> bool {
        self.company.is_none()
            && self.start_year.is_none()
            && self.current.is_none()
            && self.end_year.is_none()
            && self.role.is_none()
    }

    /// Merge the supplied fields over an existing entry
    pub fn apply(&self, entry: &mut ExperienceEntry) {
        if let Some(company) = &self.company {
            entry.company = company.clone();
        }
        if let Some(start_year) = self.start_year {
            entry.start_year = start_year;
        }
        if let Some(current) = self.current {
            entry.current = current;
        }
        if let Some(end_year) = self.end_year {
            entry.end_year = end_year;
        }
        if let Some(role) = &self.role {
            entry.role = role.clone();
        }
    }

    /// SET assignments for the relational update. Column names are
    /// static strings; only values are bound.
    pub fn set_clauses(&self) -> (Vec<&'static str>, Vec<Value>) {
        let mut columns = Vec::new();
        let mut values = Vec::new();
        if let Some(company) = &self.company {
            columns.push("empresa = ?");
            values.push(Value::from(company.clone()));
        }
        if let Some(start_year) = self.start_year {
            columns.push("inicio = ?");
            values.push(Value::from(start_year));
        }
        if let Some(current) = self.current {
            columns.push("actual = ?");
            values.push(Value::from(current));
        }
        if let Some(end_year) = self.end_year {
            columns.push("termino = ?");
            values.push(Value::from(end_year));
        }
        if let Some(role) = &self.role {
            columns.push("cargo = ?");
            values.push(Value::from(role.clone()));
        }
        (columns, values)
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn with_start_year(mut self, start_year: i32) -> Self {
        self.start_year = Some(start_year);
        self
    }

    pub fn with_current(mut self, current: bool) -> Self {
        self.current = Some(current);
        self
    }

    pub fn with_end_year(mut self, end_year: Option<i32>) -> Self {
        self.end_year = Some(end_year);
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// Sparse update for a certification record.
#[derive(Debug, Clone, Default)]
pub struct CertificationPatch {
    pub name: Option<String>,
    pub obtained_on: Option<String>,
    pub expires: Option<bool>,
    pub expires_on: Option<Option<String>>,
}

impl CertificationPatch {
    /// True when no field is supplied; such a patch issues no statement
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.obtained_on.is_none()
            && self.expires.is_none()
            && self.expires_on.is_none()
    }

    /// Merge the supplied fields over an existing entry
    pub fn apply(&self, entry: &mut CertificationEntry) {
        if let Some(name) = &self.name {
            entry.name = name.clone();
        }
        if let Some(obtained_on) = &self.obtained_on {
            entry.obtained_on = obtained_on.clone();
        }
        if let Some(expires) = self.expires {
            entry.expires = expires;
        }
        if let Some(expires_on) = &self.expires_on {
            entry.expires_on = expires_on.clone();
        }
    }

    /// SET assignments for the relational update. Column names are
    /// static strings; only values are bound.
    pub fn set_clauses(&self) -> (Vec<&'static str>, Vec<Value>) {
        let mut columns = Vec::new();
        let mut values = Vec::new();
        if let Some(name) = &self.name {
            columns.push("nombre = ?");
            values.push(Value::from(name.clone()));
        }
        if let Some(obtained_on) = &self.obtained_on {
            columns.push("fecha = ?");
            values.push(Value::from(obtained_on.clone()));
        }
        if let Some(expires) = self.expires {
            columns.push("vence = ?");
            values.push(Value::from(expires));
        }
        if let Some(expires_on) = &self.expires_on {
            columns.push("vencimiento = ?");
            values.push(Value::from(expires_on.clone()));
        }
        (columns, values)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_obtained_on(mut self, obtained_on: impl Into<String>) -> Self {
        self.obtained_on = Some(obtained_on.into());
        self
    }

    pub fn with_expires(mut self, expires: bool) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn with_expires_on(mut self, expires_on: Option<String>) -> Self {
        self.expires_on = Some(expires_on);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_json_uses_legacy_keys() {
        let session = Session::new("ana", "0042", true);
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["user"], "ana");
        assert_eq!(json["password"], "0042");
        assert_eq!(json["active"], true);
    }

    #[test]
    fn test_session_without_password_still_parses() {
        let session: Session = serde_json::from_str(r#"{"user":"ana","active":true}"#).unwrap();
        assert_eq!(session.user, "ana");
        assert_eq!(session.pin, "");
        assert!(session.active);
    }

    #[test]
    fn test_experience_json_uses_legacy_keys() {
        let entry = ExperienceEntry::new("Acme", 2015, false, Some(2018), "Developer");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["empresa"], "Acme");
        assert_eq!(json["inicio"], 2015);
        assert_eq!(json["actual"], false);
        assert_eq!(json["termino"], 2018);
        assert_eq!(json["cargo"], "Developer");
    }

    #[test]
    fn test_legacy_experience_without_id_parses_as_zero() {
        let entry: ExperienceEntry = serde_json::from_str(
            r#"{"empresa":"Acme","inicio":2015,"actual":true,"cargo":"Dev"}"#,
        )
        .unwrap();
        assert_eq!(entry.id, 0);
        assert!(entry.current);
        assert_eq!(entry.end_year, None);
    }

    #[test]
    fn test_empty_patch_is_empty() {
        assert!(ExperiencePatch::default().is_empty());
        assert!(CertificationPatch::default().is_empty());
        assert!(!ExperiencePatch::default().with_role("QA").is_empty());
    }

    #[test]
    fn test_patch_apply_merges_only_supplied_fields() {
        let mut entry = ExperienceEntry::new("Acme", 2015, true, None, "Developer");
        let patch = ExperiencePatch::default()
            .with_current(false)
            .with_end_year(Some(2019));
        patch.apply(&mut entry);
        assert_eq!(entry.company, "Acme");
        assert_eq!(entry.start_year, 2015);
        assert!(!entry.current);
        assert_eq!(entry.end_year, Some(2019));
    }

    #[test]
    fn test_patch_can_null_a_field() {
        let mut entry = ExperienceEntry::new("Acme", 2015, false, Some(2018), "Developer");
        ExperiencePatch::default()
            .with_end_year(None)
            .apply(&mut entry);
        assert_eq!(entry.end_year, None);
    }

    #[test]
    fn test_set_clauses_enumerate_supplied_fields_in_order() {
        let patch = ExperiencePatch::default()
            .with_company("Initech")
            .with_role("Architect");
        let (columns, values) = patch.set_clauses();
        assert_eq!(columns, vec!["empresa = ?", "cargo = ?"]);
        assert_eq!(values.len(), 2);

        let (columns, values) = ExperiencePatch::default().set_clauses();
        assert!(columns.is_empty());
        assert!(values.is_empty());
    }

    #[test]
    fn test_certification_patch_set_clauses() {
        let patch = CertificationPatch::default()
            .with_expires(true)
            .with_expires_on(Some("2027-01-01".to_string()));
        let (columns, _) = patch.set_clauses();
        assert_eq!(columns, vec!["vence = ?", "vencimiento = ?"]);
    }
}

use tabled::{Table, Tabled, settings::Style};

use crate::model::{CertificationEntry, ExperienceEntry};

#[derive(Tabled)]
struct ExperienceRow {
    #[tabled(rename = "Id")]
    id: i64,
    #[tabled(rename = "Company")]
    company: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "From")]
    start_year: i32,
    #[tabled(rename = "To")]
    end_year: String,
}

impl From<&ExperienceEntry> for ExperienceRow {
    fn from(entry: &ExperienceEntry) -> Self {
        let end_year = if entry.current {
            "current".to_string()
        } else {
            entry
                .end_year
                .map(|y| y.to_string())
                .unwrap_or_else(|| "-".to_string())
        };
        Self {
            id: entry.id,
            company: entry.company.clone(),
            role: entry.role.clone(),
            start_year: entry.start_year,
            end_year,
        }
    }
}

#[derive(Tabled)]
struct CertificationRow {
    #[tabled(rename = "Id")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Obtained")]
    obtained_on: String,
    #[tabled(rename = "Expires")]
    expires_on: String,
}

impl From<&CertificationEntry> for CertificationRow {
    fn from(entry: &CertificationEntry) -> Self {
        let expires_on = if entry.expires {
            entry
                .expires_on
                .clone()
                .unwrap_or_else(|| "yes".to_string())
        } else {
            "never".to_string()
        };
        Self {
            id: entry.id,
            name: entry.name.clone(),
            obtained_on: entry.obtained_on.clone(),
            expires_on,
        }
    }
}

pub fn experience_table(entries: &[ExperienceEntry]) -> String {
    let rows: Vec<ExperienceRow> = entries.iter().map(ExperienceRow::from).collect();
    Table::new(&rows).with(Style::rounded()).to_string()
}

pub fn certification_table(entries: &[CertificationEntry]) -> String {
    let rows: Vec<CertificationRow> = entries.iter().map(CertificationRow::from).collect();
    Table::new(&rows).with(Style::rounded()).to_string()
}

pub fn stats_table(stats: &[(&str, String)]) -> String {
    #[derive(Tabled)]
    struct StatRow {
        #[tabled(rename = "Metric")]
        metric: String,
        #[tabled(rename = "Value")]
        value: String,
    }

    let rows: Vec<StatRow> = stats
        .iter()
        .map(|(label, value)| StatRow {
            metric: label.to_string(),
            value: value.clone(),
        })
        .collect();
    Table::new(&rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_experience_table_marks_current_position() {
        let entries = vec![
            ExperienceEntry::new("Acme", 2020, true, None, "Lead"),
            ExperienceEntry::new("Initech", 2015, false, Some(2019), "Dev"),
        ];
        let table = experience_table(&entries);
        assert!(table.contains("Acme"));
        assert!(table.contains("current"));
        assert!(table.contains("2019"));
    }

    #[test]
    fn test_certification_table_shows_expiry() {
        let entries = vec![
            CertificationEntry::new("CCNA", "2020-06-01", true, Some("2026-06-01".to_string())),
            CertificationEntry::new("First Aid", "2018-01-15", false, None),
        ];
        let table = certification_table(&entries);
        assert!(table.contains("2026-06-01"));
        assert!(table.contains("never"));
    }
}

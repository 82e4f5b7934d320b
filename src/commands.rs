//! Command handlers for the perfil CLI
//!
//! This is the presentation glue around the persistence layer: field
//! validation, the session guard and terminal output live here. The
//! library itself stays neutral when called without a session; the CLI
//! refuses up front so the user gets a message instead of silence.

use anyhow::bail;

use perfil::model::{
    CertificationEntry, CertificationPatch, ExperienceEntry, ExperiencePatch, PersonalData,
};
use perfil::storage::ProfileStore;
use perfil::{ui, validate};

/// Route guard: record commands require a signed-in user
fn require_session(store: &ProfileStore) -> anyhow::Result<()> {
    if !store.has_active_session()? {
        bail!("no active session (run `perfil login` first)");
    }
    Ok(())
}

pub fn run_login(store: &ProfileStore, user: &str, pin: &str) -> anyhow::Result<()> {
    if !validate::valid_username(user) {
        bail!("username must be 3-8 alphanumeric characters");
    }
    if !validate::valid_pin(pin) {
        bail!("PIN must be exactly 4 digits");
    }

    if store.validate_credentials(user, pin)? {
        store.set_session_active(user, true)?;
        ui::success(&format!("Welcome back, {user}"));
    } else {
        // Unknown credentials register a new profile, as the app's
        // login form always did
        store.register_session(user, pin)?;
        ui::success(&format!("Registered new profile for {user}"));
    }
    Ok(())
}

pub fn run_logout(store: &ProfileStore) -> anyhow::Result<()> {
    match store.current_username()? {
        Some(user) => {
            store.set_session_active(&user, false)?;
            ui::success(&format!("Signed out {user}"));
        }
        None => {
            store.clear_session()?;
            ui::info("Session", "no stored user, session cleared");
        }
    }
    Ok(())
}

pub fn run_status(store: &ProfileStore) -> anyhow::Result<()> {
    let backend = if store.is_relational() {
        "relational + fallback"
    } else {
        "fallback only"
    };
    ui::status(ui::Icons::DATABASE, "Backend", backend);

    match store.current_username()? {
        Some(user) => {
            let state = if store.has_active_session()? {
                "active"
            } else {
                "inactive"
            };
            ui::status(ui::Icons::PERSON, "User", &format!("{user} ({state})"));
        }
        None => ui::status(ui::Icons::PERSON, "User", "none"),
    }
    Ok(())
}

pub fn run_personal_set(
    store: &ProfileStore,
    first_name: &str,
    last_name: &str,
    education: &str,
    birth_date: &str,
) -> anyhow::Result<()> {
    require_session(store)?;
    if !validate::valid_date(birth_date) {
        bail!("birth date must be a valid YYYY-MM-DD date");
    }

    let data = PersonalData::new(first_name, last_name, education, birth_date);
    store.save_personal_data(&data)?;
    ui::success("Personal data saved");
    Ok(())
}

pub fn run_personal_show(store: &ProfileStore) -> anyhow::Result<()> {
    require_session(store)?;
    match store.personal_data()? {
        Some(data) => {
            ui::section("Personal data");
            ui::summary_row("Name:", &format!("{} {}", data.first_name, data.last_name));
            ui::summary_row("Education:", &data.education_level);
            ui::summary_row("Born:", &data.birth_date);
        }
        None => ui::info("Personal data", "nothing saved yet"),
    }
    Ok(())
}

pub fn run_exp_add(
    store: &ProfileStore,
    company: &str,
    start_year: i32,
    current: bool,
    end_year: Option<i32>,
    role: &str,
) -> anyhow::Result<()> {
    require_session(store)?;
    if !validate::valid_start_year(start_year) {
        bail!("start year must be {} or later", validate::MIN_START_YEAR);
    }
    if current && end_year.is_some() {
        bail!("a current position has no end year");
    }
    if !current && end_year.is_none() {
        bail!("a past position needs an end year (or pass --current)");
    }

    let entry = ExperienceEntry::new(company, start_year, current, end_year, role);
    match store.add_experience(&entry)? {
        Some(id) => ui::success(&format!("Experience #{id} added")),
        None => bail!("no registered user"),
    }
    Ok(())
}

pub fn run_exp_list(store: &ProfileStore) -> anyhow::Result<()> {
    require_session(store)?;
    let entries = store.list_experience()?;
    if entries.is_empty() {
        ui::info("Experience", "no entries");
    } else {
        println!("{}", ui::experience_table(&entries));
    }
    Ok(())
}

pub fn run_exp_update(store: &ProfileStore, id: i64, patch: ExperiencePatch) -> anyhow::Result<()> {
    require_session(store)?;
    if let Some(start_year) = patch.start_year {
        if !validate::valid_start_year(start_year) {
            bail!("start year must be {} or later", validate::MIN_START_YEAR);
        }
    }
    if patch.is_empty() {
        ui::info("Update", "no fields supplied, nothing to do");
        return Ok(());
    }
    if store.update_experience(id, &patch)? {
        ui::success(&format!("Experience #{id} updated"));
    } else {
        bail!("no experience entry with id {id}");
    }
    Ok(())
}

pub fn run_exp_remove(store: &ProfileStore, id: i64) -> anyhow::Result<()> {
    require_session(store)?;
    if store.remove_experience(id)? {
        ui::success(&format!("Experience #{id} removed"));
    } else {
        bail!("no experience entry with id {id}");
    }
    Ok(())
}

pub fn run_cert_add(
    store: &ProfileStore,
    name: &str,
    obtained_on: &str,
    expires_on: Option<String>,
) -> anyhow::Result<()> {
    require_session(store)?;
    if !validate::valid_date(obtained_on) {
        bail!("obtained date must be a valid YYYY-MM-DD date");
    }
    if let Some(date) = &expires_on {
        if !validate::valid_date(date) {
            bail!("expiration date must be a valid YYYY-MM-DD date");
        }
    }

    let expires = expires_on.is_some();
    let entry = CertificationEntry::new(name, obtained_on, expires, expires_on);
    match store.add_certification(&entry)? {
        Some(id) => ui::success(&format!("Certification #{id} added")),
        None => bail!("no registered user"),
    }
    Ok(())
}

pub fn run_cert_list(store: &ProfileStore) -> anyhow::Result<()> {
    require_session(store)?;
    let entries = store.list_certifications()?;
    if entries.is_empty() {
        ui::info("Certifications", "no entries");
    } else {
        println!("{}", ui::certification_table(&entries));
    }
    Ok(())
}

pub fn run_cert_update(
    store: &ProfileStore,
    id: i64,
    patch: CertificationPatch,
) -> anyhow::Result<()> {
    require_session(store)?;
    if let Some(Some(date)) = &patch.expires_on {
        if !validate::valid_date(date) {
            bail!("expiration date must be a valid YYYY-MM-DD date");
        }
    }
    if patch.is_empty() {
        ui::info("Update", "no fields supplied, nothing to do");
        return Ok(());
    }
    if store.update_certification(id, &patch)? {
        ui::success(&format!("Certification #{id} updated"));
    } else {
        bail!("no certification with id {id}");
    }
    Ok(())
}

pub fn run_cert_remove(store: &ProfileStore, id: i64) -> anyhow::Result<()> {
    require_session(store)?;
    if store.remove_certification(id)? {
        ui::success(&format!("Certification #{id} removed"));
    } else {
        bail!("no certification with id {id}");
    }
    Ok(())
}

pub fn run_stats(store: &ProfileStore) -> anyhow::Result<()> {
    let stats = store.stats()?;
    let backend = if stats.relational {
        "relational + fallback"
    } else {
        "fallback only"
    };

    println!("{} Profile store statistics", ui::Icons::STATS);
    let rows = [
        ("Backend", backend.to_string()),
        ("Sessions", stats.sessions.to_string()),
        ("Personal records", stats.personal.to_string()),
        ("Experience records", stats.experience.to_string()),
        ("Certifications", stats.certifications.to_string()),
        ("Fallback documents", stats.fallback_documents.to_string()),
    ];
    println!("{}", ui::stats_table(&rows));
    Ok(())
}

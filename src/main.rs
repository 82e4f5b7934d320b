//! Perfil CLI - personal profile store over a dual-backend persistence layer

use std::path::PathBuf;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use perfil::config::{self, ProfileConfig};
use perfil::model::{CertificationPatch, ExperiencePatch};
use perfil::storage::ProfileStore;

mod commands;

#[derive(Parser)]
#[command(name = "perfil")]
#[command(version = "0.1.0")]
#[command(about = "Personal profile store - sessions, work history and certifications")]
#[command(long_about = r#"
Perfil keeps a local personal profile: a username/PIN session, personal
data, work experience and certifications. Records live in an embedded
SQLite database and are mirrored to a JSON fallback store; when SQLite
cannot be opened the fallback store serves on its own.

Example usage:
  perfil login --user ana --pin 0042
  perfil exp add --company Acme --start-year 2020 --current --role "Developer"
  perfil exp list
"#)]
struct Cli {
    /// Path to the config file (default: ~/.perfil/perfil.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file with the chosen storage locations
    Init {
        /// Path to the SQLite database file
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Directory for the fallback store's JSON documents
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Disable the relational backend (fallback-only mode)
        #[arg(long)]
        no_relational: bool,

        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Sign in, registering the profile on first use
    Login {
        /// Username (3-8 alphanumeric characters)
        #[arg(short, long)]
        user: String,

        /// Four-digit PIN
        #[arg(short, long)]
        pin: String,
    },

    /// Sign out the current user
    Logout,

    /// Show the active backend and session state
    Status,

    /// Personal data (one record per user)
    Personal {
        #[command(subcommand)]
        command: PersonalCommands,
    },

    /// Work experience records
    Exp {
        #[command(subcommand)]
        command: ExpCommands,
    },

    /// Certification records
    Cert {
        #[command(subcommand)]
        command: CertCommands,
    },

    /// Show storage statistics
    Stats,
}

#[derive(Subcommand)]
enum PersonalCommands {
    /// Save (or replace) your personal data
    Set {
        #[arg(long)]
        name: String,

        #[arg(long)]
        surname: String,

        /// Education level (free text)
        #[arg(long)]
        education: String,

        /// Birth date (YYYY-MM-DD)
        #[arg(long)]
        birth_date: String,
    },

    /// Show your personal data
    Show,
}

#[derive(Subcommand)]
enum ExpCommands {
    /// Add a work experience entry
    Add {
        #[arg(long)]
        company: String,

        /// Year the position started (1950 or later)
        #[arg(long)]
        start_year: i32,

        /// This is the current position (no end year)
        #[arg(long)]
        current: bool,

        /// Year the position ended
        #[arg(long)]
        end_year: Option<i32>,

        #[arg(long)]
        role: String,
    },

    /// List experience entries, newest first
    List,

    /// Update fields of an experience entry
    Update {
        /// Entry id (see `exp list`)
        id: i64,

        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        start_year: Option<i32>,

        /// Mark as the current position (clears the end year)
        #[arg(long)]
        current: bool,

        /// Set the end year (marks the position as ended)
        #[arg(long)]
        end_year: Option<i32>,

        #[arg(long)]
        role: Option<String>,
    },

    /// Remove an experience entry
    Remove {
        /// Entry id (see `exp list`)
        id: i64,
    },
}

#[derive(Subcommand)]
enum CertCommands {
    /// Add a certification
    Add {
        #[arg(long)]
        name: String,

        /// Date obtained (YYYY-MM-DD)
        #[arg(long)]
        obtained: String,

        /// Expiration date (YYYY-MM-DD); omit for non-expiring certifications
        #[arg(long)]
        expires_on: Option<String>,
    },

    /// List certifications, newest first
    List,

    /// Update fields of a certification
    Update {
        /// Certification id (see `cert list`)
        id: i64,

        #[arg(long)]
        name: Option<String>,

        /// Date obtained (YYYY-MM-DD)
        #[arg(long)]
        obtained: Option<String>,

        /// Set the expiration date
        #[arg(long)]
        expires_on: Option<String>,

        /// Mark as non-expiring (clears the expiration date)
        #[arg(long)]
        no_expiry: bool,
    },

    /// Remove a certification
    Remove {
        /// Certification id (see `cert list`)
        id: i64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    if let Commands::Init { database, data_dir, no_relational, force } = &cli.command {
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(config::default_config_path);
        let profile_config = ProfileConfig {
            database: database
                .as_ref()
                .map(|p| p.to_string_lossy().to_string()),
            data_dir: data_dir.as_ref().map(|p| p.to_string_lossy().to_string()),
            relational: no_relational.then_some(false),
        };
        config::write_config(&config_path, &profile_config, *force)?;
        perfil::ui::success(&format!("Config written to {}", config_path.display()));
        return Ok(());
    }

    let profile_config = config::load_config(cli.config.as_deref())?.unwrap_or_default();
    let store = ProfileStore::open(&profile_config)?;

    match cli.command {
        Commands::Init { .. } => unreachable!("handled above"),

        Commands::Login { user, pin } => commands::run_login(&store, &user, &pin)?,

        Commands::Logout => commands::run_logout(&store)?,

        Commands::Status => commands::run_status(&store)?,

        Commands::Personal { command } => match command {
            PersonalCommands::Set { name, surname, education, birth_date } => {
                commands::run_personal_set(&store, &name, &surname, &education, &birth_date)?
            }
            PersonalCommands::Show => commands::run_personal_show(&store)?,
        },

        Commands::Exp { command } => match command {
            ExpCommands::Add { company, start_year, current, end_year, role } => {
                commands::run_exp_add(&store, &company, start_year, current, end_year, &role)?
            }
            ExpCommands::List => commands::run_exp_list(&store)?,
            ExpCommands::Update { id, company, start_year, current, end_year, role } => {
                if current && end_year.is_some() {
                    bail!("--current and --end-year are mutually exclusive");
                }
                let mut patch = ExperiencePatch {
                    company,
                    start_year,
                    current: None,
                    end_year: end_year.map(Some),
                    role,
                };
                if current {
                    patch.current = Some(true);
                    patch.end_year = Some(None);
                } else if patch.end_year.is_some() {
                    patch.current = Some(false);
                }
                commands::run_exp_update(&store, id, patch)?
            }
            ExpCommands::Remove { id } => commands::run_exp_remove(&store, id)?,
        },

        Commands::Cert { command } => match command {
            CertCommands::Add { name, obtained, expires_on } => {
                commands::run_cert_add(&store, &name, &obtained, expires_on)?
            }
            CertCommands::List => commands::run_cert_list(&store)?,
            CertCommands::Update { id, name, obtained, expires_on, no_expiry } => {
                if no_expiry && expires_on.is_some() {
                    bail!("--no-expiry and --expires-on are mutually exclusive");
                }
                let mut patch = CertificationPatch {
                    name,
                    obtained_on: obtained,
                    expires: None,
                    expires_on: expires_on.map(Some),
                };
                if no_expiry {
                    patch.expires = Some(false);
                    patch.expires_on = Some(None);
                } else if patch.expires_on.is_some() {
                    patch.expires = Some(true);
                }
                commands::run_cert_update(&store, id, patch)?
            }
            CertCommands::Remove { id } => commands::run_cert_remove(&store, id)?,
        },

        Commands::Stats => commands::run_stats(&store)?,
    }

    Ok(())
}

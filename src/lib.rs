//! # Perfil - Personal profile store
//!
//! Dual-backend persistence for a personal profile app: username/PIN
//! sessions, personal data, work experience and certification records.
//!
//! Perfil provides:
//! - An embedded SQLite backend, preferred for reads when it is available
//! - A JSON key-value fallback store that receives every write
//! - Silent degradation to fallback-only mode when SQLite cannot open
//! - Record repositories scoped to the currently signed-in user

pub mod model;
pub mod storage;
pub mod validate;
pub mod ui;
pub mod config;

// Re-exports for convenient access
pub use model::{
    CertificationEntry, CertificationPatch, ExperienceEntry, ExperiencePatch, PersonalData,
    Session,
};
pub use storage::{Backend, FallbackStore, ProfileStore, StoreStats};

/// Result type alias for Perfil operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Perfil operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

//! Storage layer - dual-backend persistence
//!
//! SQLite is the preferred backend when it can be opened; a JSON
//! key-value store mirrors every write and serves reads on its own when
//! SQLite is absent. Tables:
//! - sesion_data(user_name, password, active)
//! - datos_personales(user_name, nombre, apellido, educacion, fnac)
//! - experiencia(id, user_name, empresa, inicio, actual, termino, cargo)
//! - certificados(id, user_name, nombre, fecha, vence, vencimiento)

pub mod backend;
pub mod fallback;
pub mod schema;
pub mod store;

pub use backend::Backend;
pub use fallback::FallbackStore;
pub use store::{ProfileStore, StoreStats};

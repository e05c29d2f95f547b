mod config;
pub mod database;
mod memory;

pub use config::{Config, GateConfig, LoggingConfig, StorageConfig, StorageKind, TrackerConfig};
pub use database::SqliteBackend;
pub use memory::MemoryBackend;

use std::path::PathBuf;

use crate::error::StorageError;
use crate::record::SiteRecord;

/// Where the record list lives.
///
/// A backend only loads and saves whole lists; ordering, validation and
/// serialization of concurrent edits are the store's job.
pub trait RecordBackend: Send {
    /// Load the full record list. A backend with nothing stored yet returns
    /// an empty list.
    fn load(&mut self) -> Result<Vec<SiteRecord>, StorageError>;

    /// Replace the stored list with `records`.
    fn save(&mut self, records: &[SiteRecord]) -> Result<(), StorageError>;
}

/// Returns `~/.config/focusgate[-dev]/` based on FOCUSGATE_ENV.
///
/// Set FOCUSGATE_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FOCUSGATE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("focusgate-dev")
    } else {
        base_dir.join("focusgate")
    };

    std::fs::create_dir_all(&dir).map_err(|e| StorageError::DataDir(e.to_string()))?;
    Ok(dir)
}

/// Open the backend selected in `config`.
pub fn open_backend(config: &StorageConfig) -> Result<Box<dyn RecordBackend>, StorageError> {
    match config.backend {
        StorageKind::Memory => Ok(Box::new(MemoryBackend::default())),
        StorageKind::Sqlite => {
            let path = data_dir()?.join(&config.db_file);
            Ok(Box::new(SqliteBackend::open_at(path)?))
        }
    }
}

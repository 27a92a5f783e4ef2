//! Core configuration.
//!
//! # Responsibility
//! - Describe where notes are stored and how logging is set up.
//! - Build the default SQLite-backed repository from that description.
//!
//! # Invariants
//! - Core never reads environment variables; hosts resolve paths and pass
//!   them in.
//! - `storage_key` is never blank after validation.

use crate::db::DbResult;
use crate::logging::default_log_level;
use crate::repo::kv_store::SqliteKeyValueStore;
use crate::repo::note_repo::{KvNoteRepository, DEFAULT_NOTES_KEY};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const DEFAULT_MAX_LOG_FILE_BYTES: u64 = 10 * 1024 * 1024;
const DEFAULT_MAX_LOG_FILES: usize = 5;

#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    Invalid(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid config document: {err}"),
            Self::Invalid(details) => write!(f, "invalid config: {details}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

/// Top-level settings for one notes process.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NotesConfig {
    /// Key under which the note list is stored.
    pub storage_key: String,
    /// SQLite file; `None` keeps notes in memory only.
    pub db_path: Option<PathBuf>,
    pub logging: LoggingConfig,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_NOTES_KEY.to_string(),
            db_path: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl NotesConfig {
    /// Parses a JSON document; missing fields take defaults.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::Invalid("storage_key cannot be empty"));
        }
        if self.logging.keep_files == 0 {
            return Err(ConfigError::Invalid("logging.keep_files must be at least 1"));
        }
        Ok(())
    }

    /// Opens the configured SQLite store and wraps it in a note repository.
    pub fn open_repository(&self) -> DbResult<KvNoteRepository<SqliteKeyValueStore>> {
        let store = match self.db_path.as_ref() {
            Some(path) => SqliteKeyValueStore::open(path)?,
            None => SqliteKeyValueStore::open_in_memory()?,
        };
        Ok(KvNoteRepository::with_key(store, self.storage_key.clone()))
    }
}

/// Rolling file log settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of `trace|debug|info|warn|error`.
    pub level: String,
    /// Absolute directory; `None` leaves logging uninitialized.
    pub log_dir: Option<PathBuf>,
    pub max_file_bytes: u64,
    pub keep_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            log_dir: None,
            max_file_bytes: DEFAULT_MAX_LOG_FILE_BYTES,
            keep_files: DEFAULT_MAX_LOG_FILES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, NotesConfig};
    use crate::repo::note_repo::NoteRepository;

    #[test]
    fn empty_document_uses_defaults() {
        let config = NotesConfig::from_json("{}").unwrap();
        assert_eq!(config, NotesConfig::default());
        assert_eq!(config.storage_key, "notes");
        assert_eq!(config.logging.keep_files, 5);
    }

    #[test]
    fn blank_storage_key_is_rejected() {
        let err = NotesConfig::from_json(r#"{"storage_key": "  "}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn open_repository_uses_configured_key() {
        let dir = tempfile::tempdir().unwrap();
        let raw = format!(
            r#"{{"storage_key": "nebula", "db_path": {}}}"#,
            serde_json::to_string(&dir.path().join("notes.db")).unwrap()
        );
        let config = NotesConfig::from_json(&raw).unwrap();

        let mut repo = config.open_repository().unwrap();
        assert_eq!(repo.key(), "nebula");
        assert!(repo.load().is_empty());
    }
}

//! Note collection persistence over a key-value store.
//!
//! # Responsibility
//! - Serialize the full note collection as one JSON blob under a fixed key.
//! - Load the collection at startup, failing open on unusable data.
//!
//! # Invariants
//! - Every `save` overwrites the whole blob; order is preserved as given.
//! - `load` never errors: absent, unreadable or corrupt data yields an empty
//!   collection.
//! - A corrupt blob is copied to `<key>.corrupt` before anything can
//!   overwrite it.
//! - Only the five known note fields are written; unknown stored fields are
//!   dropped on the next save.

use crate::db::DbError;
use crate::model::note::Note;
use crate::repo::kv_store::KeyValueStore;
use log::{debug, error, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key used by the web client.
pub const DEFAULT_NOTES_KEY: &str = "notes";
const CORRUPT_SUFFIX: &str = ".corrupt";

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error for note collection reads and writes.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Stored blob is not a valid note list, or notes failed to encode.
    Serialization(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "invalid stored notes data: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Persistence contract consumed by `NoteStore`.
pub trait NoteRepository {
    /// Loads the stored collection in storage order.
    ///
    /// Takes `&mut self` because recovering from corrupt data may write a
    /// backup entry.
    fn load(&mut self) -> Vec<Note>;
    /// Replaces the stored collection with `notes`.
    fn save(&mut self, notes: &[Note]) -> RepoResult<()>;
}

/// JSON-blob repository over any [`KeyValueStore`].
pub struct KvNoteRepository<S: KeyValueStore> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> KvNoteRepository<S> {
    /// Creates a repository using [`DEFAULT_NOTES_KEY`].
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_NOTES_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Key holding the raw text of the last blob that failed to parse.
    pub fn corrupt_backup_key(&self) -> String {
        format!("{}{CORRUPT_SUFFIX}", self.key)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Loads the collection and surfaces storage or decode failures.
    ///
    /// Absent data is not an error and yields an empty list.
    pub fn load_strict(&self) -> RepoResult<Vec<Note>> {
        match self.store.get(&self.key)? {
            Some(raw) => Ok(decode_notes(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn back_up_corrupt_blob(&mut self, raw: &str) {
        let backup_key = self.corrupt_backup_key();
        match self.store.set(&backup_key, raw) {
            Ok(()) => warn!(
                "event=notes_load module=repo status=recovered action=backup backup_key={} bytes={}",
                backup_key,
                raw.len()
            ),
            Err(err) => error!(
                "event=notes_load module=repo status=error action=backup error_code=backup_failed error={}",
                err
            ),
        }
    }
}

impl<S: KeyValueStore> NoteRepository for KvNoteRepository<S> {
    fn load(&mut self) -> Vec<Note> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("event=notes_load module=repo status=ok count=0 source=empty");
                return Vec::new();
            }
            Err(err) => {
                warn!(
                    "event=notes_load module=repo status=degraded error_code=store_unavailable error={}",
                    err
                );
                return Vec::new();
            }
        };

        match decode_notes(&raw) {
            Ok(notes) => {
                debug!(
                    "event=notes_load module=repo status=ok count={}",
                    notes.len()
                );
                notes
            }
            Err(err) => {
                warn!(
                    "event=notes_load module=repo status=degraded error_code=corrupt_data error={}",
                    err
                );
                self.back_up_corrupt_blob(&raw);
                Vec::new()
            }
        }
    }

    fn save(&mut self, notes: &[Note]) -> RepoResult<()> {
        let encoded = serde_json::to_string(notes)?;
        self.store.set(&self.key, &encoded)?;
        debug!(
            "event=notes_save module=repo status=ok count={} bytes={}",
            notes.len(),
            encoded.len()
        );
        Ok(())
    }
}

fn decode_notes(raw: &str) -> Result<Vec<Note>, serde_json::Error> {
    serde_json::from_str(raw)
}

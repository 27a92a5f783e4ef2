//! Core domain logic for Nebula Notes.
//! This crate is the single source of truth for note invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use config::{ConfigError, LoggingConfig, NotesConfig};
pub use logging::{
    default_log_level, init_logging, init_logging_with, logging_status, LoggingError,
};
pub use model::note::{validate_note_fields, Note, NoteId, NoteValidationError};
pub use repo::kv_store::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};
pub use repo::note_repo::{
    KvNoteRepository, NoteRepository, RepoError, RepoResult, DEFAULT_NOTES_KEY,
};
pub use search::view::{compare_for_display, derive_view, matches_query};
pub use service::app::NotesApp;
pub use service::clock::{Clock, SystemClock};
pub use service::editor::{CommitOutcome, Draft, EditorSession, EditorState, EditorTarget};
pub use service::note_store::{
    CreateOutcome, MutationOutcome, NoteStore, StoreError, StoreResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

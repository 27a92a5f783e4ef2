//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record persisted by core.
//! - Own the commit-time validation rule for title/content.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - `title` and `content` are non-blank once a note is stored.
//! - `created_at` is the only timestamp; edits overwrite it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a note.
pub type NoteId = Uuid;

/// Canonical persisted note.
///
/// Serialized with camelCase keys (`id`, `title`, `content`, `createdAt`,
/// `isPinned`) to stay compatible with notes written by the web client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    /// Stored exactly as typed; only trimmed for validation.
    pub title: String,
    pub content: String,
    /// Set on create and refreshed on every edit.
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_pinned: bool,
}

impl Note {
    /// Creates an unpinned note with a generated id.
    ///
    /// Fields are validated before construction; callers that only need the
    /// check should use [`validate_note_fields`].
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, NoteValidationError> {
        Self::with_id(Uuid::new_v4(), title, content, created_at)
    }

    /// Creates an unpinned note with a caller-provided id.
    ///
    /// # Errors
    /// - `NilId` when `id` is the nil UUID.
    /// - `EmptyTitle` / `EmptyContent` when either field is blank.
    pub fn with_id(
        id: NoteId,
        title: impl Into<String>,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, NoteValidationError> {
        if id.is_nil() {
            return Err(NoteValidationError::NilId);
        }
        let title = title.into();
        let content = content.into();
        validate_note_fields(&title, &content)?;

        Ok(Self {
            id,
            title,
            content,
            created_at,
            is_pinned: false,
        })
    }

    /// Replaces title/content and refreshes the timestamp.
    ///
    /// Pin state is left untouched.
    pub fn apply_edit(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
        now: DateTime<Utc>,
    ) {
        self.title = title.into();
        self.content = content.into();
        self.created_at = now;
    }

    pub fn toggle_pin(&mut self) {
        self.is_pinned = !self.is_pinned;
    }

    /// `created_at` in the persisted wire format.
    pub fn created_at_iso(&self) -> String {
        iso_millis::format(&self.created_at)
    }
}

/// Validation failure for note field input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValidationError {
    NilId,
    EmptyTitle,
    EmptyContent,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "note id must not be nil"),
            Self::EmptyTitle => write!(f, "note title must not be blank"),
            Self::EmptyContent => write!(f, "note content must not be blank"),
        }
    }
}

impl Error for NoteValidationError {}

/// Checks the commit-time rule: both fields non-empty after trimming.
///
/// Title is checked first, so a fully blank draft reports `EmptyTitle`.
pub fn validate_note_fields(title: &str, content: &str) -> Result<(), NoteValidationError> {
    if title.trim().is_empty() {
        return Err(NoteValidationError::EmptyTitle);
    }
    if content.trim().is_empty() {
        return Err(NoteValidationError::EmptyContent);
    }
    Ok(())
}

/// ISO-8601 with millisecond precision and `Z` suffix, e.g.
/// `2024-03-01T10:15:30.123Z`.
///
/// Finer stored precision is truncated on read so a reloaded note equals
/// what the next save writes.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|parsed| parsed.with_timezone(&Utc).trunc_subsecs(3))
            .map_err(|err| serde::de::Error::custom(format!("invalid createdAt `{raw}`: {err}")))
    }
}

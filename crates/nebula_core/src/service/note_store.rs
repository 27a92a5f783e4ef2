//! Note store: the owned, persisted note collection.
//!
//! # Responsibility
//! - Hold the note collection in storage order (newest created first).
//! - Apply create/update/delete/toggle-pin and persist after each one.
//!
//! # Invariants
//! - Ids are unique within the collection.
//! - Rejected or not-found mutations neither change state nor write.
//! - Every applied mutation writes the whole collection before returning.
//! - `update` keeps position and pin state; only `created_at` moves.

use crate::model::note::{validate_note_fields, Note, NoteId, NoteValidationError};
use crate::repo::note_repo::{NoteRepository, RepoError};
use crate::service::clock::{Clock, SystemClock};
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store failure. Only persistence can fail; validation and missing ids are
/// reported through [`MutationOutcome`].
#[derive(Debug)]
pub enum StoreError {
    /// The mutation was applied in memory but could not be written.
    Persistence(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Persistence(err) => write!(f, "failed to persist notes: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Persistence(value)
    }
}

/// Result of an id-addressed mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    /// Input failed validation; nothing changed.
    Invalid(NoteValidationError),
    /// No note with the given id; nothing changed.
    NotFound,
}

impl MutationOutcome {
    pub fn is_applied(self) -> bool {
        self == Self::Applied
    }
}

/// Result of [`NoteStore::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(Note),
    /// Input failed validation; nothing changed.
    Invalid(NoteValidationError),
}

impl CreateOutcome {
    pub fn into_note(self) -> Option<Note> {
        match self {
            Self::Created(note) => Some(note),
            Self::Invalid(_) => None,
        }
    }
}

/// Owned note collection bound to one repository.
pub struct NoteStore<R: NoteRepository, C: Clock = SystemClock> {
    repo: R,
    clock: C,
    notes: Vec<Note>,
}

impl<R: NoteRepository> NoteStore<R, SystemClock> {
    /// Loads the stored collection using the system clock.
    pub fn open(repo: R) -> Self {
        Self::with_clock(repo, SystemClock)
    }
}

impl<R: NoteRepository, C: Clock> NoteStore<R, C> {
    /// Loads the stored collection once; later reads are served from memory.
    pub fn with_clock(mut repo: R, clock: C) -> Self {
        let notes = repo.load();
        info!(
            "event=store_open module=store status=ok count={}",
            notes.len()
        );
        Self { repo, clock, notes }
    }

    /// Notes in storage order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Creates an unpinned note at the front of the collection.
    ///
    /// Blank (after trimming) title or content yields `Invalid` without any
    /// write.
    pub fn create(&mut self, title: &str, content: &str) -> StoreResult<CreateOutcome> {
        let note = match Note::with_id(self.fresh_id(), title, content, self.clock.now()) {
            Ok(note) => note,
            Err(reason) => {
                debug!("event=note_create module=store status=rejected reason={reason}");
                return Ok(CreateOutcome::Invalid(reason));
            }
        };
        self.notes.insert(0, note.clone());
        self.persist("note_create", note.id)?;
        Ok(CreateOutcome::Created(note))
    }

    /// Replaces title and content and refreshes the timestamp.
    pub fn update(
        &mut self,
        id: NoteId,
        title: &str,
        content: &str,
    ) -> StoreResult<MutationOutcome> {
        if let Err(reason) = validate_note_fields(title, content) {
            debug!(
                "event=note_update module=store status=rejected note_id={id} reason={reason}"
            );
            return Ok(MutationOutcome::Invalid(reason));
        }

        let now = self.clock.now();
        let Some(note) = self.notes.iter_mut().find(|note| note.id == id) else {
            debug!("event=note_update module=store status=not_found note_id={id}");
            return Ok(MutationOutcome::NotFound);
        };
        note.apply_edit(title, content, now);
        self.persist("note_update", id)?;
        Ok(MutationOutcome::Applied)
    }

    /// Removes the note unconditionally; confirmation belongs to the caller.
    pub fn delete(&mut self, id: NoteId) -> StoreResult<MutationOutcome> {
        let Some(index) = self.notes.iter().position(|note| note.id == id) else {
            debug!("event=note_delete module=store status=not_found note_id={id}");
            return Ok(MutationOutcome::NotFound);
        };
        self.notes.remove(index);
        self.persist("note_delete", id)?;
        Ok(MutationOutcome::Applied)
    }

    /// Flips the pin flag without touching any other field.
    pub fn toggle_pin(&mut self, id: NoteId) -> StoreResult<MutationOutcome> {
        let Some(note) = self.notes.iter_mut().find(|note| note.id == id) else {
            debug!("event=note_toggle_pin module=store status=not_found note_id={id}");
            return Ok(MutationOutcome::NotFound);
        };
        note.toggle_pin();
        self.persist("note_toggle_pin", id)?;
        Ok(MutationOutcome::Applied)
    }

    fn fresh_id(&self) -> NoteId {
        loop {
            let candidate = Uuid::new_v4();
            if !candidate.is_nil() && self.get(candidate).is_none() {
                return candidate;
            }
        }
    }

    fn persist(&mut self, event: &'static str, id: NoteId) -> StoreResult<()> {
        match self.repo.save(&self.notes) {
            Ok(()) => {
                info!(
                    "event={event} module=store status=ok note_id={id} count={}",
                    self.notes.len()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event={event} module=store status=error note_id={id} error_code=persist_failed error={err}"
                );
                Err(err.into())
            }
        }
    }
}

//! Editor session for create-or-edit flows.
//!
//! # Responsibility
//! - Hold transient draft title/content while the editor is open.
//! - Validate on commit and delegate to the store.
//!
//! # Invariants
//! - A rejected commit keeps the session open and leaves the store untouched.
//! - Any non-rejected commit closes the session, even when the write fails.
//! - Draft text is never persisted by the session itself.

use crate::model::note::{validate_note_fields, Note, NoteId, NoteValidationError};
use crate::repo::note_repo::NoteRepository;
use crate::service::clock::Clock;
use crate::service::note_store::{CreateOutcome, MutationOutcome, NoteStore, StoreResult};
use log::debug;

/// What an open session will commit into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorTarget {
    New,
    Editing(NoteId),
}

/// Draft fields as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditorState {
    #[default]
    Closed,
    Open { target: EditorTarget, draft: Draft },
}

/// Result of [`EditorSession::commit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Created(Note),
    Updated(NoteId),
    /// The edited note no longer exists; the session closed anyway.
    TargetMissing(NoteId),
    /// Blank field; session stays open.
    Rejected(NoteValidationError),
    /// Commit while closed; nothing happened.
    NotOpen,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorSession {
    state: EditorState,
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, EditorState::Open { .. })
    }

    pub fn target(&self) -> Option<EditorTarget> {
        match &self.state {
            EditorState::Open { target, .. } => Some(*target),
            EditorState::Closed => None,
        }
    }

    pub fn draft(&self) -> Option<&Draft> {
        match &self.state {
            EditorState::Open { draft, .. } => Some(draft),
            EditorState::Closed => None,
        }
    }

    /// Modal heading for the current target.
    pub fn heading(&self) -> Option<&'static str> {
        self.target().map(|target| match target {
            EditorTarget::New => "New Note",
            EditorTarget::Editing(_) => "Edit Note",
        })
    }

    /// Opens with an empty draft.
    pub fn open_for_create(&mut self) {
        self.state = EditorState::Open {
            target: EditorTarget::New,
            draft: Draft::default(),
        };
    }

    /// Opens with the draft seeded from `note`.
    pub fn open_for_edit(&mut self, note: &Note) {
        self.state = EditorState::Open {
            target: EditorTarget::Editing(note.id),
            draft: Draft {
                title: note.title.clone(),
                content: note.content.clone(),
            },
        };
    }

    /// Ignored while closed.
    pub fn set_title(&mut self, title: impl Into<String>) {
        if let EditorState::Open { draft, .. } = &mut self.state {
            draft.title = title.into();
        }
    }

    /// Ignored while closed.
    pub fn set_content(&mut self, content: impl Into<String>) {
        if let EditorState::Open { draft, .. } = &mut self.state {
            draft.content = content.into();
        }
    }

    /// Discards the draft and closes.
    pub fn cancel(&mut self) {
        self.state = EditorState::Closed;
    }

    /// Commits the current draft.
    pub fn commit_draft<R, C>(
        &mut self,
        store: &mut NoteStore<R, C>,
    ) -> StoreResult<CommitOutcome>
    where
        R: NoteRepository,
        C: Clock,
    {
        let Some(draft) = self.draft().cloned() else {
            return Ok(CommitOutcome::NotOpen);
        };
        self.commit(store, &draft.title, &draft.content)
    }

    /// Commits `title`/`content` into the store.
    ///
    /// The submitted values replace the draft, so a rejected commit shows
    /// what the user typed.
    ///
    /// # Errors
    /// Propagates persistence failures from the store; the session is
    /// already closed at that point.
    pub fn commit<R, C>(
        &mut self,
        store: &mut NoteStore<R, C>,
        title: &str,
        content: &str,
    ) -> StoreResult<CommitOutcome>
    where
        R: NoteRepository,
        C: Clock,
    {
        let Some(target) = self.target() else {
            debug!("event=editor_commit module=editor status=rejected reason=not_open");
            return Ok(CommitOutcome::NotOpen);
        };

        if let Err(reason) = validate_note_fields(title, content) {
            self.set_title(title);
            self.set_content(content);
            debug!("event=editor_commit module=editor status=rejected reason={reason}");
            return Ok(CommitOutcome::Rejected(reason));
        }

        self.state = EditorState::Closed;
        let outcome = match target {
            EditorTarget::New => match store.create(title, content)? {
                CreateOutcome::Created(note) => CommitOutcome::Created(note),
                CreateOutcome::Invalid(reason) => CommitOutcome::Rejected(reason),
            },
            EditorTarget::Editing(id) => match store.update(id, title, content)? {
                MutationOutcome::Applied => CommitOutcome::Updated(id),
                MutationOutcome::NotFound => CommitOutcome::TargetMissing(id),
                MutationOutcome::Invalid(reason) => CommitOutcome::Rejected(reason),
            },
        };
        Ok(outcome)
    }
}

//! Intent dispatcher owned by the presentation shell.
//!
//! # Responsibility
//! - Own the note store, the editor session and the current search text.
//! - Map one user intent to one store/editor call.
//!
//! # Invariants
//! - The visible list is recomputed from the store on every read.
//! - Delete is unconditional here; the shell confirms before dispatching.

use crate::model::note::{Note, NoteId};
use crate::repo::note_repo::NoteRepository;
use crate::search::view::derive_view;
use crate::service::clock::{Clock, SystemClock};
use crate::service::editor::{CommitOutcome, EditorSession};
use crate::service::note_store::{MutationOutcome, NoteStore, StoreResult};

pub struct NotesApp<R: NoteRepository, C: Clock = SystemClock> {
    store: NoteStore<R, C>,
    editor: EditorSession,
    search_query: String,
}

impl<R: NoteRepository> NotesApp<R, SystemClock> {
    /// Loads stored notes and starts with a closed editor and empty search.
    pub fn open(repo: R) -> Self {
        Self::new(NoteStore::open(repo))
    }
}

impl<R: NoteRepository, C: Clock> NotesApp<R, C> {
    pub fn new(store: NoteStore<R, C>) -> Self {
        Self {
            store,
            editor: EditorSession::new(),
            search_query: String::new(),
        }
    }

    pub fn store(&self) -> &NoteStore<R, C> {
        &self.store
    }

    pub fn editor(&self) -> &EditorSession {
        &self.editor
    }

    /// Draft keystrokes go through here.
    pub fn editor_mut(&mut self) -> &mut EditorSession {
        &mut self.editor
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Filtered and ordered notes for the current search text.
    pub fn visible_notes(&self) -> Vec<&Note> {
        derive_view(self.store.notes(), &self.search_query)
    }

    pub fn add_note(&mut self) {
        self.editor.open_for_create();
    }

    /// Opens the editor on an existing note. Returns `false` for an unknown id.
    pub fn edit_note(&mut self, id: NoteId) -> bool {
        match self.store.get(id) {
            Some(note) => {
                self.editor.open_for_edit(note);
                true
            }
            None => false,
        }
    }

    pub fn save(&mut self, title: &str, content: &str) -> StoreResult<CommitOutcome> {
        self.editor.commit(&mut self.store, title, content)
    }

    pub fn save_draft(&mut self) -> StoreResult<CommitOutcome> {
        self.editor.commit_draft(&mut self.store)
    }

    pub fn cancel(&mut self) {
        self.editor.cancel();
    }

    pub fn delete_note(&mut self, id: NoteId) -> StoreResult<MutationOutcome> {
        self.store.delete(id)
    }

    pub fn toggle_pin(&mut self, id: NoteId) -> StoreResult<MutationOutcome> {
        self.store.toggle_pin(id)
    }

    pub fn search_changed(&mut self, text: impl Into<String>) {
        self.search_query = text.into();
    }
}

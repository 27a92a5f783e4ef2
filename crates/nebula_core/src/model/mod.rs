//! Domain model for notes.
//!
//! # Responsibility
//! - Define the note record shared by store, query and editor layers.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Deletion is a hard removal from the collection.

pub mod note;

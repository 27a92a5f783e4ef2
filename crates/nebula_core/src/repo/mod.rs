//! Persistence contracts and implementations.
//!
//! # Responsibility
//! - Define the key-value collaborator the note collection is stored in.
//! - Isolate serialization and SQLite details from the store.
//!
//! # Invariants
//! - The whole collection lives under one key and is rewritten on save.

pub mod kv_store;
pub mod note_repo;

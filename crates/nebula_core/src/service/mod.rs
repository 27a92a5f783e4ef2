//! Core use-case services.
//!
//! # Responsibility
//! - Own the note collection and apply user intents to it.
//! - Keep the presentation shell decoupled from storage details.

pub mod app;
pub mod clock;
pub mod editor;
pub mod note_store;

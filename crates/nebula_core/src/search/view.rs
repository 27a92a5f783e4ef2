//! Derived note view: search filter plus display ordering.
//!
//! # Responsibility
//! - Filter notes by case-insensitive substring match on title or content.
//! - Order the result pinned-first, then newest `created_at` first.
//!
//! # Invariants
//! - Pure: no I/O, no caching, input slice untouched.
//! - Sort is stable; equal keys keep storage order.
//! - An empty query keeps every note.

use crate::model::note::Note;
use std::cmp::Ordering;

/// Builds the visible list for `query` from notes in storage order.
pub fn derive_view<'a>(notes: &'a [Note], query: &str) -> Vec<&'a Note> {
    let needle = query.to_lowercase();
    let mut view = notes
        .iter()
        .filter(|note| matches_folded(note, &needle))
        .collect::<Vec<_>>();
    view.sort_by(|a, b| compare_for_display(a, b));
    view
}

/// Returns whether `query` occurs in the note's title or content, ignoring
/// case.
pub fn matches_query(note: &Note, query: &str) -> bool {
    matches_folded(note, &query.to_lowercase())
}

/// Display ordering: pinned before unpinned, then `created_at` descending.
pub fn compare_for_display(a: &Note, b: &Note) -> Ordering {
    b.is_pinned
        .cmp(&a.is_pinned)
        .then_with(|| b.created_at.cmp(&a.created_at))
}

fn matches_folded(note: &Note, needle: &str) -> bool {
    needle.is_empty()
        || note.title.to_lowercase().contains(needle)
        || note.content.to_lowercase().contains(needle)
}

//! Note query entry points.
//!
//! # Responsibility
//! - Derive the visible note list from the store and the current search text.
//! - Keep filtering and ordering rules inside core.

pub mod view;

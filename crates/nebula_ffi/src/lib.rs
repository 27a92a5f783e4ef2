//! Flutter bridge for the Nebula Notes core.

pub mod api;

//! Input: pointer events mapped to camera drag actions.
//!
//! # Invariants
//! - Drag deltas are relative to the previous pointer position, not the origin.
//! - Moves and releases outside a drag produce [`Action::Noop`].

pub mod action;
mod pointer;

pub use action::Action;
pub use pointer::{PointerEvent, PointerTracker};

pub fn crate_info() -> &'static str {
    "terrascene-input v0.1.0"
}

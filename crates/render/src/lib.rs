//! Rendering adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers cannot mutate the scene.
//! - Camera view derives only from the scene's current camera pose.

mod renderer;

pub use renderer::{DebugTextRenderer, Projection, Renderer, view_matrix, view_projection};

pub fn crate_info() -> &'static str {
    "terrascene-render v0.1.0"
}

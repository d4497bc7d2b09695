//! wgpu render backend for the scene.
//!
//! Draws a noise-shaded background, the terrain mesh, and one instanced
//! octahedron per particle, viewed from the scene's current camera pose.
//!
//! # Invariants
//! - Renderer never mutates the scene.
//! - Terrain geometry is uploaded once; only uniforms and particle instances
//!   change per frame.

mod gpu;
mod shaders;

pub use gpu::WgpuRenderer;

//! Scene kernel: the per-frame update for camera, particles and terrain.
//!
//! # Invariants
//! - One [`terrascene_noise::PermutationTable`] per scene, built at
//!   construction and only read afterwards.
//! - Particle positions are a pure function of rest offset and scene time.
//! - Camera state changes only through actions and frame steps.

pub mod camera;
mod clock;
pub mod particles;
mod rng;
mod scene;
pub mod terrain;

pub use camera::CameraRig;
pub use clock::FrameClock;
pub use particles::{Particle, ParticleField};
pub use rng::SplitMix64;
pub use scene::{Scene, SceneSummary};
pub use terrain::{Terrain, TerrainVertex, clamp_segments, terrain_height};

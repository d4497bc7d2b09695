//! Noise: classic 3-D Perlin gradient noise.
//!
//! # Invariants
//! - Pure function of the inputs and an immutable permutation table.
//! - Period 256 along every axis; output roughly in `[-1, 1]`.
//! - No global state: callers build one [`PermutationTable`] and share it.

mod perlin;
mod permutation;

pub use perlin::{fade, grad, lerp, perlin3};
pub use permutation::{PermutationTable, TABLE_LEN};

pub fn crate_info() -> &'static str {
    "terrascene-noise v0.1.0"
}

use glam::Vec3;
use terrascene_noise::PermutationTable;

use crate::rng::SplitMix64;

/// Spatial frequency applied to a particle's rest offset before sampling noise.
pub const SPATIAL_SCALE: f64 = 0.1;
/// Rate at which scene time scrolls through the noise field.
pub const TIME_SCALE: f64 = 0.1;
/// Maximum displacement (world units) from the rest offset, per axis.
pub const AMPLITUDE: f64 = 2.0;
/// Noise-space phase added per axis so x, y and z wander independently.
pub const AXIS_PHASES: [f64; 3] = [0.0, 100.0, 200.0];
/// Per-particle time offsets are drawn from `[0, TIME_OFFSET_RANGE)`.
pub const TIME_OFFSET_RANGE: f32 = 100.0;

/// A particle's fixed rest offset and time phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub offset: Vec3,
    pub time_offset: f32,
}

impl Particle {
    /// Live position at scene time `time`.
    ///
    /// Pure in `(self, time)`: nothing from earlier frames feeds in.
    pub fn position_at(&self, table: &PermutationTable, time: f64) -> Vec3 {
        let phase = time * TIME_SCALE + self.time_offset as f64;
        let rest = self.offset.to_array();
        let mut live = [0.0f32; 3];
        for axis in 0..3 {
            let n = table.noise2(
                rest[axis] as f64 * SPATIAL_SCALE,
                phase + AXIS_PHASES[axis],
            );
            live[axis] = (rest[axis] as f64 + n * AMPLITUDE) as f32;
        }
        Vec3::from_array(live)
    }
}

/// Fixed set of particles plus a reusable buffer of their live positions.
#[derive(Debug, Clone, Default)]
pub struct ParticleField {
    particles: Vec<Particle>,
    positions: Vec<Vec3>,
}

impl ParticleField {
    pub fn new(particles: Vec<Particle>) -> Self {
        let positions = particles.iter().map(|p| p.offset).collect();
        Self {
            particles,
            positions,
        }
    }

    /// Scatter `count` particles uniformly in a cube of edge `spread` centred
    /// on the origin, with time offsets in `[0, TIME_OFFSET_RANGE)`.
    pub fn scatter(count: usize, spread: f32, seed: u64) -> Self {
        let mut rng = SplitMix64::new(seed);
        let half = spread * 0.5;
        let particles = (0..count)
            .map(|_| Particle {
                offset: Vec3::new(
                    rng.next_centered(half),
                    rng.next_centered(half),
                    rng.next_centered(half),
                ),
                time_offset: rng.next_f32() * TIME_OFFSET_RANGE,
            })
            .collect();
        Self::new(particles)
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Live positions as of the last [`ParticleField::update`].
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Recompute every live position for scene time `time`.
    pub fn update(&mut self, table: &PermutationTable, time: f64) {
        for (slot, particle) in self.positions.iter_mut().zip(&self.particles) {
            *slot = particle.position_at(table, time);
        }
    }
}

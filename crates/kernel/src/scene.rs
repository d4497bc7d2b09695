use terrascene_common::{Pose, SceneConfig};
use terrascene_input::Action;
use terrascene_noise::PermutationTable;

use crate::camera::CameraRig;
use crate::clock::FrameClock;
use crate::particles::ParticleField;
use crate::terrain::Terrain;

/// Everything the frame loop owns.
///
/// Input reaches the scene only through [`Scene::apply`]; time only through
/// [`Scene::step`]. Renderers read it and never write.
#[derive(Debug, Clone)]
pub struct Scene {
    table: PermutationTable,
    clock: FrameClock,
    camera: CameraRig,
    particles: ParticleField,
    terrain: Terrain,
}

impl Scene {
    /// Build the scene. The permutation table is constructed here once and
    /// shared by reference with every noise evaluation afterwards.
    pub fn new(config: &SceneConfig) -> Self {
        let table = PermutationTable::new();
        let terrain = Terrain::generate(
            &table,
            config.terrain_size,
            config.terrain_segments,
            config.terrain_elevation,
        );
        let mut particles =
            ParticleField::scatter(config.particle_count, config.particle_spread, config.seed);
        particles.update(&table, 0.0);

        tracing::info!(
            particles = particles.len(),
            terrain_vertices = terrain.vertices().len(),
            seed = config.seed,
            "scene built"
        );

        Self {
            table,
            clock: FrameClock::new(),
            camera: CameraRig::new(config.camera),
            particles,
            terrain,
        }
    }

    pub fn apply(&mut self, action: Action) {
        if !action.is_noop() {
            tracing::trace!(?action, "scene action");
        }
        self.camera.apply(action);
    }

    /// Advance one frame by `dt` seconds.
    pub fn step(&mut self, dt: f64) {
        let _span = tracing::trace_span!("scene_step").entered();
        self.clock.advance(dt);
        self.camera.step();
        self.particles.update(&self.table, self.clock.elapsed());
    }

    pub fn time(&self) -> f64 {
        self.clock.elapsed()
    }

    pub fn frames(&self) -> u64 {
        self.clock.frames()
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn camera_pose(&self) -> &Pose {
        self.camera.current()
    }

    pub fn particles(&self) -> &ParticleField {
        &self.particles
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    pub fn summary(&self) -> SceneSummary {
        SceneSummary {
            frames: self.frames(),
            time: self.time(),
            camera: *self.camera.current(),
            target: *self.camera.target(),
            returning: self.camera.is_returning(),
            particle_count: self.particles.len(),
            terrain_vertices: self.terrain.vertices().len(),
        }
    }
}

/// Point-in-time snapshot of scene state for logs and overlays.
#[derive(Debug, Clone)]
pub struct SceneSummary {
    pub frames: u64,
    pub time: f64,
    pub camera: Pose,
    pub target: Pose,
    pub returning: bool,
    pub particle_count: usize,
    pub terrain_vertices: usize,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: frames={} time={:.2}s particles={} terrain_vertices={} returning={}",
            self.frames, self.time, self.particle_count, self.terrain_vertices, self.returning
        )
    }
}

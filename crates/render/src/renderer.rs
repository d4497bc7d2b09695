use std::fmt::Write;

use glam::Mat4;
use terrascene_common::Pose;
use terrascene_kernel::Scene;

/// Perspective projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Width over height.
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Projection {
    /// Update the aspect ratio for a new viewport size. Zero heights are
    /// treated as one pixel.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }
}

/// World-to-view transform for a camera at `pose`.
pub fn view_matrix(pose: &Pose) -> Mat4 {
    pose.to_matrix().inverse()
}

/// Combined projection * view for a camera at `pose`.
pub fn view_projection(pose: &Pose, projection: &Projection) -> Mat4 {
    projection.matrix() * view_matrix(pose)
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads scene state and a projection, then produces output. It
/// never mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given scene and projection.
    fn render(&self, scene: &Scene, projection: &Projection) -> Self::Output;
}

/// Text renderer for headless runs and tests.
///
/// Produces a human-readable dump of the scene: clock, camera, and the first
/// few live particle positions.
#[derive(Debug)]
pub struct DebugTextRenderer {
    max_particles: usize,
}

impl Default for DebugTextRenderer {
    fn default() -> Self {
        Self { max_particles: 5 }
    }
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// List at most `max_particles` particle positions.
    pub fn with_max_particles(max_particles: usize) -> Self {
        Self { max_particles }
    }
}

fn fmt_pose(p: &Pose) -> String {
    format!(
        "pos=({:.3}, {:.3}, {:.3}) rot=({:.3}, {:.3}, {:.3})",
        p.position.x, p.position.y, p.position.z, p.rotation.x, p.rotation.y, p.rotation.z
    )
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, projection: &Projection) -> String {
        let mut out = String::new();
        let camera = scene.camera();
        let _ = writeln!(
            out,
            "=== Scene (frame={}, time={:.3}s) ===",
            scene.frames(),
            scene.time()
        );
        let _ = writeln!(out, "Camera:  {}", fmt_pose(camera.current()));
        let _ = writeln!(out, "Target:  {}", fmt_pose(camera.target()));
        let _ = writeln!(out, "Returning: {}", camera.is_returning());
        let _ = writeln!(
            out,
            "Projection: fov={:.0} aspect={:.3}",
            projection.fov_degrees, projection.aspect
        );

        let terrain = scene.terrain();
        let (lo, hi) = terrain.height_range();
        let _ = writeln!(
            out,
            "Terrain: {}x{} segments, size={:.1}, heights=[{:.3}, {:.3}]",
            terrain.segments(),
            terrain.segments(),
            terrain.size(),
            lo,
            hi
        );

        let positions = scene.particles().positions();
        let _ = writeln!(out, "Particles: {}", positions.len());
        for (i, p) in positions.iter().take(self.max_particles).enumerate() {
            let _ = writeln!(out, "  [{i:>4}] pos=({:.3}, {:.3}, {:.3})", p.x, p.y, p.z);
        }

        out
    }
}

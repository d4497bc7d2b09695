use glam::{Vec2, Vec3};
use terrascene_common::Pose;
use terrascene_input::Action;

/// Per-frame rate at which the target eases back to the rest pose after release.
pub const RETURN_RATE: f32 = 0.05;
/// Per-frame rate at which the camera follows its target.
pub const FOLLOW_RATE: f32 = 0.1;
/// World units of target translation per pixel of drag.
pub const DRAG_TRANSLATE_SCALE: f32 = 0.01;
/// Radians of target rotation per pixel of drag.
pub const DRAG_ROTATE_SCALE: f32 = 0.005;

/// Drag-driven camera with two-stage exponential smoothing.
///
/// Drags move the target pose; every frame the camera eases toward the
/// target. After release the target itself eases back to the rest pose. The
/// return decay never snaps or stops: it keeps running after the motion is
/// visually settled.
#[derive(Debug, Clone)]
pub struct CameraRig {
    current: Pose,
    target: Pose,
    initial: Pose,
    returning: bool,
}

impl CameraRig {
    pub fn new(initial: Pose) -> Self {
        Self {
            current: initial,
            target: initial,
            initial,
            returning: false,
        }
    }

    pub fn current(&self) -> &Pose {
        &self.current
    }

    pub fn target(&self) -> &Pose {
        &self.target
    }

    pub fn initial(&self) -> &Pose {
        &self.initial
    }

    pub fn is_returning(&self) -> bool {
        self.returning
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::BeginDrag => self.returning = false,
            Action::Drag(delta) => self.drag(delta),
            Action::EndDrag => self.returning = true,
            Action::Noop => {}
        }
    }

    /// Accumulate a screen-space drag delta into the target. Unclamped.
    pub fn drag(&mut self, delta: Vec2) {
        self.target.position += Vec3::new(delta.x, -delta.y, 0.0) * DRAG_TRANSLATE_SCALE;
        self.target.rotation += Vec3::new(delta.y, delta.x, 0.0) * DRAG_ROTATE_SCALE;
    }

    /// Advance one frame of smoothing.
    pub fn step(&mut self) {
        if self.returning {
            self.target = self.target.lerp(&self.initial, RETURN_RATE);
        }
        self.current = self.current.lerp(&self.target, FOLLOW_RATE);
    }
}

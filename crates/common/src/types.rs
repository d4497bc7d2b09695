use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position plus Euler rotation (XYZ order, radians).
///
/// Rotations are kept as raw angles rather than a quaternion so that drag
/// input can accumulate into them and smoothing can interpolate each angle
/// independently.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Vec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
        }
    }
}

impl Pose {
    pub fn new(position: Vec3, rotation: Vec3) -> Self {
        Self { position, rotation }
    }

    /// Componentwise `self + (other - self) * t`.
    pub fn lerp(&self, other: &Pose, t: f32) -> Pose {
        Pose {
            position: self.position + (other.position - self.position) * t,
            rotation: self.rotation + (other.rotation - self.rotation) * t,
        }
    }

    /// Combined positional and angular distance to `other`.
    pub fn distance(&self, other: &Pose) -> f32 {
        let dp = self.position - other.position;
        let dr = self.rotation - other.rotation;
        (dp.length_squared() + dr.length_squared()).sqrt()
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }

    /// Local-to-world transform.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation(), self.position)
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite()
    }
}

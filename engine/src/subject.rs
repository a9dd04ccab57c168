//! Subject Data Model
//!
//! A *subject* is the entity the chase camera trails - owned entirely by
//! the host simulation. The camera system never creates or destroys
//! subjects; it reads an immutable per-frame snapshot of each one.

use glam::Vec3;

use crate::math::{yaw_backward, yaw_forward};

/// Stable identity key for a subject, used to index per-subject camera
/// sessions and smoothing state across frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubjectId(pub u64);

/// View orientation in degrees (pitch, yaw, roll).
///
/// Pitch is positive looking down, zero at the horizon. Yaw 0 faces +X.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewAngles {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl ViewAngles {
    pub fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }
}

/// Current pose of a subject: world origin, view angles, and velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubjectPose {
    /// World-space origin (feet position), Z-up.
    pub origin: Vec3,
    /// Current view angles in degrees.
    pub angles: ViewAngles,
    /// World-space velocity in units per second.
    pub velocity: Vec3,
}

impl SubjectPose {
    /// Horizontal unit vector the subject faces.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        yaw_forward(self.angles.yaw)
    }

    /// Horizontal unit vector behind the subject - the camera's retreat
    /// direction.
    #[inline]
    pub fn backward(&self) -> Vec3 {
        yaw_backward(self.angles.yaw)
    }
}

/// Read-only per-frame view of a host entity.
///
/// `pose` is `None` when the host could not produce valid pose data this
/// frame; geometry functions treat that as the zero-vector sentinel rather
/// than an error.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectSnapshot {
    pub id: SubjectId,
    /// False once the subject died or disconnected; the driver skips it.
    pub alive: bool,
    pub pose: Option<SubjectPose>,
}

impl SubjectSnapshot {
    /// The pose, but only while the subject is alive. Dead subjects report
    /// no usable pose even if the host still carries stale coordinates.
    pub fn valid_pose(&self) -> Option<&SubjectPose> {
        if self.alive { self.pose.as_ref() } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose(yaw: f32) -> SubjectPose {
        SubjectPose {
            origin: Vec3::ZERO,
            angles: ViewAngles::new(0.0, yaw, 0.0),
            velocity: Vec3::ZERO,
        }
    }

    #[test]
    fn backward_is_opposite_of_forward() {
        let p = pose(37.0);
        assert!((p.forward() + p.backward()).length() < 1e-5);
    }

    #[test]
    fn dead_subject_has_no_valid_pose() {
        let snap = SubjectSnapshot {
            id: SubjectId(1),
            alive: false,
            pose: Some(pose(0.0)),
        };
        assert!(snap.valid_pose().is_none());
    }

    #[test]
    fn alive_subject_without_pose_has_no_valid_pose() {
        let snap = SubjectSnapshot {
            id: SubjectId(1),
            alive: true,
            pose: None,
        };
        assert!(snap.valid_pose().is_none());
    }
}

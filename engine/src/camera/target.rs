//! Target Position Calculator
//!
//! Derives the raw, un-smoothed camera position for one frame: eye point
//! above the subject (pitch-scaled so a steep look angle does not push the
//! camera into terrain), backward projection to the desired distance,
//! ground clearance from a downward probe, occlusion clamping from a
//! line-of-sight probe, and a fixed fallback when the result collapses
//! onto the subject.
//!
//! Also home to the collision-safe distance resolver (camera-vs-subject
//! proximity) and the horizontal facing test shared with the damage
//! redirect rule.
//!
//! All functions here are pure over their inputs; world geometry enters
//! only through a caller-supplied probe closure, so tests script hits
//! directly.

use glam::Vec3;
use std::f32::consts::FRAC_PI_2;

use crate::config::{CameraConfig, TuningConfig};
use crate::probe::{ProbeMask, ProbeResult};
use crate::subject::{SubjectPose, SubjectSnapshot, ViewAngles};

/// Raw camera pose for a frame: where the camera should sit and which way
/// it should face. Orientation always equals the subject's current view
/// angles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetPose {
    pub position: Vec3,
    pub angles: ViewAngles,
}

impl TargetPose {
    /// The defined result for a subject with no usable pose: all-zero.
    /// Callers that know the subject is invalid must not apply it.
    pub fn sentinel() -> Self {
        Self {
            position: Vec3::ZERO,
            angles: ViewAngles::default(),
        }
    }
}

/// Point at a horizontal offset along the subject's facing direction plus
/// a vertical offset. Negative `forward_offset` places the point behind
/// the subject; activation uses this for the camera's initial pose.
///
/// Returns the zero vector when the subject has no usable pose.
pub fn position_in_front(snapshot: &SubjectSnapshot, forward_offset: f32, z_offset: f32) -> Vec3 {
    let Some(pose) = snapshot.valid_pose() else {
        return Vec3::ZERO;
    };
    pose.origin + pose.forward() * forward_offset + Vec3::new(0.0, 0.0, z_offset)
}

/// Largest backward distance (up to `max_distance`) whose camera probe
/// point stays clear of every other subject's proximity zone.
///
/// Walks outward in `tuning.proximity_step` increments. The first
/// violating distance wins and the last known-clear distance is returned;
/// since the walk is monotonic that is also the closest violation. A
/// subject with no usable pose yields `max_distance` unchanged.
pub fn safe_distance(
    snapshot: &SubjectSnapshot,
    others: &[Vec3],
    max_distance: f32,
    vertical_offset: f32,
    tuning: &TuningConfig,
) -> f32 {
    let Some(pose) = snapshot.valid_pose() else {
        return max_distance;
    };
    let step = tuning.proximity_step;
    if step <= 0.0 || others.is_empty() {
        return max_distance;
    }

    let backward = pose.backward();
    let rise = Vec3::new(0.0, 0.0, vertical_offset);
    let mut distance = step;
    while distance <= max_distance {
        let candidate = pose.origin + backward * distance + rise;
        let blocked = others
            .iter()
            .any(|origin| (*origin - candidate).length() < tuning.proximity_radius);
        if blocked {
            return (distance - step).max(0.0);
        }
        distance += step;
    }
    max_distance
}

/// Compute the raw camera pose for a frame.
///
/// `distance` is the desired backward distance, normally the output of
/// [`safe_distance`]. `probe` casts one ray against the world and must
/// fail open (report a miss) when the query is unavailable.
///
/// Returns [`TargetPose::sentinel`] when the subject has no usable pose.
pub fn compute_target<P>(
    snapshot: &SubjectSnapshot,
    distance: f32,
    config: &CameraConfig,
    mut probe: P,
) -> TargetPose
where
    P: FnMut(Vec3, Vec3, ProbeMask) -> ProbeResult,
{
    let Some(pose) = snapshot.valid_pose() else {
        return TargetPose::sentinel();
    };
    let tuning = &config.tuning;

    // Eye point: vertical offset shrinks as the subject looks steeply up
    // or down, down to half at +-90 degrees of pitch.
    let pitch = pose.angles.pitch.to_radians();
    let offset_scale = 1.0 - (pitch.abs() / FRAC_PI_2).clamp(0.0, 0.5);
    let eye = pose.origin + Vec3::new(0.0, 0.0, config.height * offset_scale);

    let backward = pose.backward();
    let unobstructed = eye + backward * distance;

    // Minimum allowed Z: subject origin plus a fixed margin, raised
    // further if the downward probe finds ground under the target point.
    let mut min_z = pose.origin.z + tuning.floor_margin;
    let ground = probe(
        unobstructed + Vec3::new(0.0, 0.0, tuning.ground_probe_rise),
        unobstructed - Vec3::new(0.0, 0.0, tuning.ground_probe_depth),
        ProbeMask::Solid,
    );
    if ground.hit {
        min_z = min_z.max(ground.point.z + tuning.ground_clearance);
    }

    // Occlusion: pull the camera to just short of the first shot-blocking
    // surface between the eye and the target, never closer than the
    // configured minimum.
    let mut position = unobstructed;
    if config.block_camera {
        let occlusion = probe(eye, unobstructed, ProbeMask::Shot);
        if occlusion.hit {
            let hit_distance = (occlusion.point - eye).length();
            let ceiling = distance.max(tuning.min_camera_distance);
            let clamped =
                (hit_distance - tuning.occlusion_margin).clamp(tuning.min_camera_distance, ceiling);
            position = eye + backward * clamped;
        }
    }

    position.z = position.z.max(min_z);

    // Camera pinned onto the subject (e.g. backed into a corner): fall
    // back to the nearest pose the follow bands accept, behind and above,
    // instead of leaving the camera inside the subject's collision volume.
    if (position - pose.origin).length() < tuning.degenerate_radius {
        position = pose.origin
            + backward * tuning.min_follow_distance
            + Vec3::new(0.0, 0.0, tuning.min_height_above);
    }

    TargetPose {
        position,
        angles: pose.angles,
    }
}

/// True when `point` lies behind the subject's horizontal facing
/// direction (negative dot with the forward vector). Feeds the damage
/// redirect rule: a third-person attacker hitting someone behind their
/// facing has the damage refunded.
pub fn is_behind(pose: &SubjectPose, point: Vec3) -> bool {
    (point - pose.origin).dot(pose.forward()) < 0.0
}

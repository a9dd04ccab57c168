//! Geometry Utilities
//!
//! Stateless vector and angle math shared by the camera target calculator
//! and the smoothing tracker. Vector algebra (lerp, dot, length, zero-safe
//! normalization) comes straight from [`glam::Vec3`]; this module adds the
//! pieces glam does not carry: degree-based angle wrapping, shortest-arc
//! angle stepping, and yaw-derived horizontal direction vectors.
//!
//! # Conventions
//!
//! The simulation is Z-up: X/Y span the horizontal plane and Z is height.
//! Angles enter and leave in degrees; radians exist only inside the
//! trigonometric calls. A yaw of 0 faces +X, growing counter-clockwise.

use glam::Vec3;

/// Component-wise linear interpolation: `a + (b - a) * t`.
///
/// `t` is deliberately not clamped; callers that need a bounded blend
/// factor (the smoothing tracker does) clamp before calling.
#[inline]
pub fn lerp(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a + (b - a) * t
}

/// Euclidean length of the horizontal (XY) components only.
///
/// Used wherever vertical motion must not count, e.g. the horizontal
/// speed feeding the smoothing blend factor.
#[inline]
pub fn length2d(v: Vec3) -> f32 {
    (v.x * v.x + v.y * v.y).sqrt()
}

/// Wrap an angle in degrees into the `(-180, 180]` range.
///
/// Idempotent: wrapping an already-wrapped angle is a no-op.
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 { wrapped - 360.0 } else { wrapped }
}

/// Step `current` toward `target` along the shortest arc, moving at most
/// `max_step` degrees. Both inputs may be unwrapped; the result is wrapped
/// into `(-180, 180]`.
pub fn move_towards_angle(current: f32, target: f32, max_step: f32) -> f32 {
    let delta = normalize_angle(target - current);
    normalize_angle(current + delta.clamp(-max_step.abs(), max_step.abs()))
}

/// Horizontal unit vector a subject with the given yaw (degrees) faces:
/// `(cos(yaw), sin(yaw), 0)`.
#[inline]
pub fn yaw_forward(yaw_deg: f32) -> Vec3 {
    let yaw = yaw_deg.to_radians();
    Vec3::new(yaw.cos(), yaw.sin(), 0.0)
}

/// Horizontal unit vector pointing behind a subject with the given yaw
/// (degrees): `(-cos(yaw), -sin(yaw), 0)`. This is the direction the
/// chase camera retreats along.
#[inline]
pub fn yaw_backward(yaw_deg: f32) -> Vec3 {
    -yaw_forward(yaw_deg)
}

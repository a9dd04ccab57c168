//! Ray Probe Adapter
//!
//! Wraps the host's world ray query behind a single trait. The camera uses
//! two logical masks: solid world geometry for ground detection, and the
//! shot-blocking mask for line-of-sight occlusion against walls and props.
//!
//! A probe is fail-open: when the host query is unavailable the adapter
//! reports a miss and the frame proceeds with the unobstructed target. One
//! frame without occlusion detection is a cosmetic glitch; a dropped frame
//! loop is not.

use glam::Vec3;

use crate::subject::SubjectId;

/// Which world geometry a ray should collide with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMask {
    /// Solid world geometry only - used for ground detection.
    Solid,
    /// Everything that blocks a shot (walls, props) - used for camera
    /// occlusion.
    Shot,
}

/// Outcome of a single ray probe. Transient: produced per call, never
/// stored across frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeResult {
    /// Whether the ray hit anything before reaching its target.
    pub hit: bool,
    /// World-space hit point; meaningless when `hit` is false.
    pub point: Vec3,
}

impl ProbeResult {
    /// A probe that reached its target unobstructed.
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec3::ZERO,
        }
    }

    /// A probe that stopped at `point`.
    pub fn hit_at(point: Vec3) -> Self {
        Self { hit: true, point }
    }

    /// Distance from `origin` to the hit point. Zero for a miss.
    pub fn distance_from(&self, origin: Vec3) -> f32 {
        if self.hit {
            (self.point - origin).length()
        } else {
            0.0
        }
    }
}

/// The host's ray-cast capability.
///
/// `ignore` excludes one subject's own body from the trace (a camera probe
/// starting at a subject's eyes must not hit that subject). Returning
/// `None` means the query was unavailable this frame.
pub trait RayProbe {
    fn cast(
        &self,
        origin: Vec3,
        target: Vec3,
        mask: ProbeMask,
        ignore: Option<SubjectId>,
    ) -> Option<ProbeResult>;
}

/// Cast a ray, failing open: an unavailable world query reports a miss
/// instead of propagating an error.
pub fn probe<W: RayProbe + ?Sized>(
    world: &W,
    origin: Vec3,
    target: Vec3,
    mask: ProbeMask,
    ignore: Option<SubjectId>,
) -> ProbeResult {
    world
        .cast(origin, target, mask, ignore)
        .unwrap_or_else(ProbeResult::miss)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UnavailableWorld;

    impl RayProbe for UnavailableWorld {
        fn cast(&self, _: Vec3, _: Vec3, _: ProbeMask, _: Option<SubjectId>) -> Option<ProbeResult> {
            None
        }
    }

    struct WallWorld {
        wall: Vec3,
    }

    impl RayProbe for WallWorld {
        fn cast(
            &self,
            _origin: Vec3,
            _target: Vec3,
            mask: ProbeMask,
            _ignore: Option<SubjectId>,
        ) -> Option<ProbeResult> {
            match mask {
                ProbeMask::Shot => Some(ProbeResult::hit_at(self.wall)),
                ProbeMask::Solid => Some(ProbeResult::miss()),
            }
        }
    }

    #[test]
    fn unavailable_query_fails_open() {
        let result = probe(
            &UnavailableWorld,
            Vec3::ZERO,
            Vec3::new(10.0, 0.0, 0.0),
            ProbeMask::Shot,
            None,
        );
        assert!(!result.hit);
    }

    #[test]
    fn hit_reports_distance_from_origin() {
        let world = WallWorld {
            wall: Vec3::new(50.0, 0.0, 0.0),
        };
        let result = probe(
            &world,
            Vec3::ZERO,
            Vec3::new(110.0, 0.0, 0.0),
            ProbeMask::Shot,
            None,
        );
        assert!(result.hit);
        assert!((result.distance_from(Vec3::ZERO) - 50.0).abs() < 1e-4);
    }

    #[test]
    fn miss_has_zero_distance() {
        assert_eq!(ProbeResult::miss().distance_from(Vec3::new(5.0, 5.0, 5.0)), 0.0);
    }
}

//! Smoothing / State Tracker
//!
//! Per-subject temporal filter that turns the noisy raw target into a
//! stable rendered position. One low-pass blend with secondary hard
//! clamps, not a physical spring: determinism and a bounded worst-case
//! displacement per tick matter more than physical realism.
//!
//! Per-frame sequence:
//!
//! 1. Elapsed time since the subject's last accepted update (first tick
//!    and clock regressions count as zero).
//! 2. Velocity-adaptive blend factor - faster subjects get a more
//!    responsive camera - clamped into a configured band.
//! 3. Three-axis lerp from the last accepted position toward the raw
//!    target.
//! 4. Z rate limit: vertical motion is the dominant jitter source (stairs,
//!    jumps), so the Z change per tick is capped from vertical speed and
//!    elapsed time.
//! 5. Z band re-clamp relative to the subject's current height.
//! 6. Follow-distance band: a camera that drifted too close or too far is
//!    projected back onto the nearest bound.
//! 7. Commit as the new last accepted position.

use glam::Vec3;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::config::TuningConfig;
use crate::math::{length2d, lerp};
use crate::subject::{SubjectId, SubjectPose};

/// Last accepted camera position and when it was accepted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingState {
    pub last_position: Vec3,
    /// Wall-clock seconds of the last accepted update.
    pub last_update: f64,
}

/// Per-subject smoothing state store.
///
/// A subject is either untracked (no state; the next update seeds from the
/// raw target with zero blend) or tracking. State lives exactly as long as
/// the subject's smoothed session: the session registry clears it on
/// deactivation and on round reset.
#[derive(Debug, Default)]
pub struct SmoothingTracker {
    states: BTreeMap<SubjectId, SmoothingState>,
}

impl SmoothingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the subject currently has smoothing state.
    pub fn is_tracking(&self, id: SubjectId) -> bool {
        self.states.contains_key(&id)
    }

    /// Number of subjects currently tracked.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Last accepted position for a subject, if tracked.
    pub fn last_position(&self, id: SubjectId) -> Option<Vec3> {
        self.states.get(&id).map(|s| s.last_position)
    }

    /// Advance one subject's filter by one tick and return the position to
    /// commit. `raw` is the frame's raw target, `now` wall-clock seconds.
    pub fn advance(
        &mut self,
        id: SubjectId,
        raw: Vec3,
        pose: &SubjectPose,
        now: f64,
        tuning: &TuningConfig,
    ) -> Vec3 {
        let state = match self.states.entry(id) {
            Entry::Vacant(slot) => {
                // First tick of a session: accept the raw target as-is.
                slot.insert(SmoothingState {
                    last_position: raw,
                    last_update: now,
                });
                return raw;
            }
            Entry::Occupied(slot) => slot.into_mut(),
        };

        let dt = (now - state.last_update).max(0.0) as f32;
        let horizontal_speed = length2d(pose.velocity);
        let vertical_speed = pose.velocity.z.abs();

        // An inverted blend band (misconfiguration) falls back to the raw
        // factor bounded to [0, 1] rather than panicking in the frame loop.
        let raw_blend = horizontal_speed * tuning.blend_horizontal_response
            + vertical_speed * tuning.blend_vertical_response;
        let blend = if tuning.blend_min <= tuning.blend_max {
            raw_blend.clamp(tuning.blend_min, tuning.blend_max)
        } else {
            raw_blend.clamp(0.0, 1.0)
        };
        let mut next = lerp(state.last_position, raw, blend);

        // Z rate limit. dt of zero allows no vertical movement this tick.
        let max_dz = (vertical_speed * tuning.z_rate_gain + tuning.z_rate_floor) * dt;
        let dz = next.z - state.last_position.z;
        if dz.abs() > max_dz {
            next.z = state.last_position.z + dz.signum() * max_dz;
        }

        // Height band relative to the subject. A misconfigured inverted
        // band is skipped rather than panicking in the frame loop.
        let min_z = pose.origin.z + tuning.min_height_above;
        let max_z = pose.origin.z + tuning.max_height_above;
        if min_z <= max_z {
            next.z = next.z.clamp(min_z, max_z);
        }

        // Follow-distance band: project onto the nearest bound along the
        // subject-to-camera direction. An inverted band is skipped, same as
        // the height band above.
        let offset = next - pose.origin;
        let distance = offset.length();
        if tuning.min_follow_distance <= tuning.max_follow_distance
            && (distance < tuning.min_follow_distance || distance > tuning.max_follow_distance)
        {
            let direction = offset.normalize_or_zero();
            next = if direction == Vec3::ZERO {
                pose.origin
                    + pose.backward() * tuning.min_follow_distance
                    + Vec3::new(0.0, 0.0, tuning.min_height_above)
            } else {
                pose.origin
                    + direction
                        * distance.clamp(tuning.min_follow_distance, tuning.max_follow_distance)
            };
        }

        state.last_position = next;
        state.last_update = now;
        next
    }

    /// Drop one subject's state (session ended).
    pub fn clear(&mut self, id: SubjectId) {
        self.states.remove(&id);
    }

    /// Drop all state (round reset).
    pub fn clear_all(&mut self) {
        self.states.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subject::ViewAngles;

    const TICK: f64 = 1.0 / 64.0;

    fn still_pose() -> SubjectPose {
        SubjectPose {
            origin: Vec3::ZERO,
            angles: ViewAngles::default(),
            velocity: Vec3::ZERO,
        }
    }

    fn moving_pose(velocity: Vec3) -> SubjectPose {
        SubjectPose {
            velocity,
            ..still_pose()
        }
    }

    #[test]
    fn first_update_seeds_with_raw_target() {
        let mut tracker = SmoothingTracker::new();
        let raw = Vec3::new(-110.0, 0.0, 76.0);
        let out = tracker.advance(SubjectId(1), raw, &still_pose(), 10.0, &TuningConfig::default());
        assert_eq!(out, raw);
        assert!(tracker.is_tracking(SubjectId(1)));
        assert_eq!(tracker.last_position(SubjectId(1)), Some(raw));
    }

    #[test]
    fn inverted_bands_degrade_without_panicking() {
        // A config file can ship any band; inverted bounds must never take
        // down the frame loop.
        let mut tuning = TuningConfig::default();
        tuning.blend_min = 0.5;
        tuning.blend_max = 0.05;
        tuning.min_height_above = 110.0;
        tuning.max_height_above = 24.0;
        tuning.min_follow_distance = 160.0;
        tuning.max_follow_distance = 16.0;
        let id = SubjectId(1);
        let pose = moving_pose(Vec3::new(300.0, 0.0, 50.0));

        let mut tracker = SmoothingTracker::new();
        tracker.advance(id, Vec3::new(-110.0, 0.0, 76.0), &pose, 0.0, &tuning);
        let out = tracker.advance(id, Vec3::new(-90.0, 10.0, 80.0), &pose, TICK, &tuning);
        assert!(out.x.is_finite() && out.y.is_finite() && out.z.is_finite());
        assert_eq!(tracker.last_position(id), Some(out));
    }

    #[test]
    fn converges_to_stationary_target_and_settles() {
        let mut tracker = SmoothingTracker::new();
        let tuning = TuningConfig::default();
        let id = SubjectId(1);
        let pose = still_pose();

        // Seed away from the final target, then hold the target fixed.
        let mut now = 0.0;
        tracker.advance(id, Vec3::new(-40.0, 30.0, 50.0), &pose, now, &tuning);
        let target = Vec3::new(-110.0, 0.0, 76.0);

        let mut previous = f32::MAX;
        let mut settled_at = None;
        for frame in 0..600 {
            now += TICK;
            let out = tracker.advance(id, target, &pose, now, &tuning);
            let remaining = (out - target).length();
            assert!(
                remaining <= previous + 1e-4,
                "distance to target grew at frame {frame}: {remaining} > {previous}"
            );
            previous = remaining;
            if remaining < 0.5 && settled_at.is_none() {
                settled_at = Some(frame);
            }
        }
        assert!(
            settled_at.is_some(),
            "camera never settled, still {previous} away"
        );
    }

    #[test]
    fn z_change_respects_rate_limit() {
        let mut tracker = SmoothingTracker::new();
        let tuning = TuningConfig::default();
        let id = SubjectId(1);
        let velocity = Vec3::new(0.0, 0.0, 200.0);
        let pose = moving_pose(velocity);

        let start = Vec3::new(-110.0, 0.0, 30.0);
        tracker.advance(id, start, &pose, 0.0, &tuning);

        let dt = TICK as f32;
        let max_dz = (velocity.z.abs() * tuning.z_rate_gain + tuning.z_rate_floor) * dt;
        let out = tracker.advance(id, Vec3::new(-110.0, 0.0, 90.0), &pose, TICK, &tuning);
        assert!((out.z - start.z).abs() <= max_dz + 1e-4);
    }

    #[test]
    fn zero_elapsed_time_freezes_z_without_nan() {
        let mut tracker = SmoothingTracker::new();
        let tuning = TuningConfig::default();
        let id = SubjectId(1);
        let pose = still_pose();

        let start = Vec3::new(-110.0, 0.0, 60.0);
        tracker.advance(id, start, &pose, 5.0, &tuning);
        // Same timestamp again: Z must not move and nothing may be NaN.
        let out = tracker.advance(id, Vec3::new(-110.0, 0.0, 90.0), &pose, 5.0, &tuning);
        assert_eq!(out.z, start.z);
        assert!(out.x.is_finite() && out.y.is_finite() && out.z.is_finite());
    }

    #[test]
    fn clock_regression_counts_as_zero_elapsed() {
        let mut tracker = SmoothingTracker::new();
        let tuning = TuningConfig::default();
        let id = SubjectId(1);
        let pose = still_pose();

        let start = Vec3::new(-110.0, 0.0, 60.0);
        tracker.advance(id, start, &pose, 5.0, &tuning);
        let out = tracker.advance(id, Vec3::new(-110.0, 0.0, 90.0), &pose, 4.0, &tuning);
        assert_eq!(out.z, start.z);
    }

    #[test]
    fn faster_subjects_blend_more_aggressively() {
        let tuning = TuningConfig::default();
        let id = SubjectId(1);
        let start = Vec3::new(-110.0, 0.0, 76.0);
        let target = Vec3::new(-60.0, 0.0, 76.0);

        let mut slow = SmoothingTracker::new();
        slow.advance(id, start, &still_pose(), 0.0, &tuning);
        let slow_out = slow.advance(id, target, &still_pose(), TICK, &tuning);

        let fast_pose = moving_pose(Vec3::new(400.0, 0.0, 0.0));
        let mut fast = SmoothingTracker::new();
        fast.advance(id, start, &fast_pose, 0.0, &tuning);
        let fast_out = fast.advance(id, target, &fast_pose, TICK, &tuning);

        let slow_moved = (slow_out - start).length();
        let fast_moved = (fast_out - start).length();
        assert!(
            fast_moved > slow_moved,
            "fast {fast_moved} should out-move slow {slow_moved}"
        );
    }

    #[test]
    fn blend_factor_is_clamped_to_band() {
        let tuning = TuningConfig::default();
        let id = SubjectId(1);
        let start = Vec3::new(-100.0, 0.0, 76.0);
        let target = Vec3::new(-60.0, 0.0, 76.0);

        // Absurd speed: blend must cap at blend_max.
        let pose = moving_pose(Vec3::new(1e6, 0.0, 0.0));
        let mut tracker = SmoothingTracker::new();
        tracker.advance(id, start, &pose, 0.0, &tuning);
        let out = tracker.advance(id, target, &pose, TICK, &tuning);
        let expected = lerp(start, target, tuning.blend_max);
        assert!((out - expected).length() < 1e-3);
    }

    #[test]
    fn height_band_clamps_relative_to_subject() {
        let mut tuning = TuningConfig::default();
        tuning.z_rate_floor = 1e6; // rate limit out of the way
        let id = SubjectId(1);
        let pose = still_pose();

        let mut tracker = SmoothingTracker::new();
        tracker.advance(id, Vec3::new(-110.0, 0.0, 300.0), &pose, 0.0, &tuning);
        let out = tracker.advance(id, Vec3::new(-110.0, 0.0, 300.0), &pose, TICK, &tuning);
        assert!(out.z <= pose.origin.z + tuning.max_height_above + 1e-4);
        assert!(out.z >= pose.origin.z + tuning.min_height_above - 1e-4);
    }

    #[test]
    fn distance_band_projects_onto_nearest_bound() {
        let mut tuning = TuningConfig::default();
        tuning.z_rate_floor = 1e6;
        let id = SubjectId(1);
        let pose = still_pose();

        // Camera way out past the maximum follow distance.
        let far = Vec3::new(-400.0, 0.0, 80.0);
        let mut tracker = SmoothingTracker::new();
        tracker.advance(id, far, &pose, 0.0, &tuning);
        let out = tracker.advance(id, far, &pose, TICK, &tuning);
        let distance = (out - pose.origin).length();
        assert!(
            (distance - tuning.max_follow_distance).abs() < 1e-2,
            "expected projection onto max bound, got {distance}"
        );
        // Direction from the subject is preserved.
        let dir_before = (far - pose.origin).normalize_or_zero();
        let dir_after = (out - pose.origin).normalize_or_zero();
        assert!((dir_before - dir_after).length() < 1e-3);
    }

    #[test]
    fn clear_forgets_state() {
        let mut tracker = SmoothingTracker::new();
        let tuning = TuningConfig::default();
        let id = SubjectId(1);
        tracker.advance(id, Vec3::new(-110.0, 0.0, 76.0), &still_pose(), 0.0, &tuning);
        tracker.clear(id);
        assert!(!tracker.is_tracking(id));
        // Next update re-seeds rather than blending from stale state.
        let raw = Vec3::new(50.0, 50.0, 76.0);
        let out = tracker.advance(id, raw, &still_pose(), 1.0, &tuning);
        assert_eq!(out, raw);
    }

    #[test]
    fn clear_all_empties_tracker() {
        let mut tracker = SmoothingTracker::new();
        let tuning = TuningConfig::default();
        tracker.advance(SubjectId(1), Vec3::ONE, &still_pose(), 0.0, &tuning);
        tracker.advance(SubjectId(2), Vec3::ONE, &still_pose(), 0.0, &tuning);
        assert_eq!(tracker.len(), 2);
        tracker.clear_all();
        assert!(tracker.is_empty());
    }
}

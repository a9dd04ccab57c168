//! Camera Session Registry & Per-Frame Driver
//!
//! [`CameraSystem`] owns every active camera session and all smoothing
//! state - an explicit store, never ambient globals, so independent
//! instances (per test, per world) coexist. It decides when camera
//! entities are created and destroyed; the host performs the actual
//! entity work.
//!
//! Everything here runs on the host's single frame/command thread:
//! `frame_update` once per simulation frame, the command and event hooks
//! whenever the host dispatches them. Nothing blocks and nothing spawns.

use glam::Vec3;
use log::{debug, warn};
use std::collections::BTreeMap;

use crate::camera::smoothing::SmoothingTracker;
use crate::camera::target::{compute_target, is_behind, position_in_front, safe_distance};
use crate::config::CameraConfig;
use crate::host::{CAMERA_TINT_INVISIBLE, CameraHandle, Host};
use crate::probe::probe;
use crate::subject::SubjectId;

/// How a session commits camera positions each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    /// Raw target committed directly every frame.
    Instant,
    /// Raw target filtered through the smoothing tracker.
    Smoothed,
}

/// One subject's active camera: the external entity handle, the update
/// mode, the post-activation settle schedule, and the stripped inventory
/// to restore on deactivation.
#[derive(Debug, Clone)]
pub struct CameraSession {
    pub handle: CameraHandle,
    pub mode: CameraMode,
    /// Driver ticks elapsed since activation.
    age_ticks: u32,
    /// Tick indices (relative to activation) still owed a direct
    /// re-commit of the raw target. Masks the host's one-frame attach
    /// glitch without deferred callbacks.
    pending_corrections: Vec<u32>,
    /// Item names and counts held before activation stripped them.
    stored_items: Option<Vec<(String, u32)>>,
}

/// Result of the activation command, mostly for the host's own logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Activated,
    Deactivated,
    /// Permission gate rejected the caller.
    Denied,
    /// Dead/missing subject or the host refused an entity; nothing
    /// changed.
    Ignored,
}

/// The camera subsystem: session registry, smoothing state, and the
/// per-frame driver.
#[derive(Debug)]
pub struct CameraSystem {
    config: CameraConfig,
    sessions: BTreeMap<SubjectId, CameraSession>,
    smoothing: SmoothingTracker,
}

impl CameraSystem {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            sessions: BTreeMap::new(),
            smoothing: SmoothingTracker::new(),
        }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Number of active sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn has_session(&self, id: SubjectId) -> bool {
        self.sessions.contains_key(&id)
    }

    /// The session's mode, if the subject has one.
    pub fn session_mode(&self, id: SubjectId) -> Option<CameraMode> {
        self.sessions.get(&id).map(|s| s.mode)
    }

    /// Whether smoothing state exists for the subject (diagnostics).
    pub fn is_smoothing(&self, id: SubjectId) -> bool {
        self.smoothing.is_tracking(id)
    }

    /// Command entry point: toggle the subject's camera session.
    ///
    /// Respects the configured permission gate. A dead or missing subject
    /// is ignored. A session whose camera entity has died is torn down
    /// first and the command proceeds as if it were already deactivated.
    pub fn on_activation_command(&mut self, host: &mut dyn Host, id: SubjectId) -> ToggleOutcome {
        if self.config.admin_only && !host.has_permission(id, &self.config.admin_flag) {
            let message = self.config.msg_no_permission.clone();
            host.print_chat(id, &message);
            return ToggleOutcome::Denied;
        }

        let alive = host.subject(id).is_some_and(|s| s.alive);

        // Stale session: subject died or the camera entity vanished while
        // the session was still registered. Tear it down and treat the
        // command as if the session were already gone.
        let stale = self
            .sessions
            .get(&id)
            .is_some_and(|session| !alive || !host.entity_valid(session.handle));
        if stale {
            warn!("camera session for subject {} went stale, tearing down", id.0);
            if let Some(session) = self.sessions.remove(&id) {
                self.release_session(host, id, session);
            }
        }

        if !alive {
            return ToggleOutcome::Ignored;
        }

        if self.has_session(id) {
            if self.deactivate(host, id) {
                ToggleOutcome::Deactivated
            } else {
                ToggleOutcome::Ignored
            }
        } else {
            let mode = if self.config.use_smooth {
                CameraMode::Smoothed
            } else {
                CameraMode::Instant
            };
            if self.activate(host, id, mode) {
                ToggleOutcome::Activated
            } else {
                ToggleOutcome::Ignored
            }
        }
    }

    /// Create a camera session for the subject. No-op (returns false) if
    /// one already exists, the subject is unusable, or the host cannot
    /// allocate an entity.
    pub fn activate(&mut self, host: &mut dyn Host, id: SubjectId, mode: CameraMode) -> bool {
        if self.sessions.contains_key(&id) {
            return false;
        }
        let Some(snapshot) = host.subject(id) else {
            return false;
        };
        let Some(pose) = snapshot.valid_pose().copied() else {
            return false;
        };

        let Some(handle) = host.create_camera_entity() else {
            warn!("host refused a camera entity for subject {}", id.0);
            return false;
        };
        host.spawn_entity(handle);
        host.set_render_color(handle, CAMERA_TINT_INVISIBLE);

        let initial = position_in_front(&snapshot, -self.config.distance, self.config.height);
        host.teleport_entity(handle, initial, pose.angles, Vec3::ZERO);
        host.set_view_entity(id, Some(handle));

        let stored_items = self
            .config
            .strip_on_use
            .then(|| strip_items(host, id));

        self.sessions.insert(
            id,
            CameraSession {
                handle,
                mode,
                age_ticks: 0,
                pending_corrections: self.config.tuning.settle_ticks.clone(),
                stored_items,
            },
        );

        let message = format!("{}{}", self.config.chat_prefix, self.config.msg_activated);
        host.print_chat(id, &message);
        debug!("activated {mode:?} camera for subject {}", id.0);
        true
    }

    /// Tear down the subject's camera session: view restored, entity
    /// destroyed, inventory returned, smoothing state cleared. Returns
    /// false if no session existed.
    pub fn deactivate(&mut self, host: &mut dyn Host, id: SubjectId) -> bool {
        let Some(session) = self.sessions.remove(&id) else {
            return false;
        };
        self.release_session(host, id, session);
        let message = format!("{}{}", self.config.chat_prefix, self.config.msg_deactivated);
        host.print_chat(id, &message);
        debug!("deactivated camera for subject {}", id.0);
        true
    }

    /// Round boundary: drop every session and all smoothing state. Camera
    /// entities do not survive round transitions; the host reclaims them.
    pub fn reset_all(&mut self) {
        if !self.sessions.is_empty() {
            debug!("round reset, dropping {} camera session(s)", self.sessions.len());
        }
        self.sessions.clear();
        self.smoothing.clear_all();
    }

    /// Event hook: round start.
    pub fn on_round_start(&mut self) {
        self.reset_all();
    }

    /// Event hook: damage dealt. A third-person attacker hitting a victim
    /// that lies behind the attacker's facing has the damage refunded onto
    /// the victim's health and armor.
    pub fn on_damage_event(
        &self,
        host: &mut dyn Host,
        attacker: SubjectId,
        victim: SubjectId,
        dmg_health: i32,
        dmg_armor: i32,
    ) {
        if !self.sessions.contains_key(&attacker) {
            return;
        }
        let (Some(a), Some(v)) = (host.subject(attacker), host.subject(victim)) else {
            return;
        };
        let (Some(attacker_pose), Some(victim_pose)) = (a.valid_pose(), v.valid_pose()) else {
            return;
        };
        if is_behind(attacker_pose, victim_pose.origin) {
            let health = host.health(victim);
            host.set_health(victim, health + dmg_health);
            let armor = host.armor(victim);
            host.set_armor(victim, armor + dmg_armor);
        }
    }

    /// Per-frame driver. For every session: skip subjects or handles that
    /// have become invalid, derive the raw target (collision-safe distance
    /// plus probes), filter through smoothing when the session asks for
    /// it, and commit the pose to the camera entity. One subject's bad
    /// data never stops the loop for the others.
    pub fn frame_update(&mut self, host: &mut dyn Host, now: f64) {
        let ids: Vec<SubjectId> = self.sessions.keys().copied().collect();
        if ids.is_empty() {
            return;
        }
        let all_subjects = host.subjects();

        for id in ids {
            let Some(snapshot) = host.subject(id) else {
                continue;
            };
            let Some(session) = self.sessions.get_mut(&id) else {
                continue;
            };
            if !snapshot.alive || !host.entity_valid(session.handle) {
                continue;
            }
            let Some(pose) = snapshot.valid_pose().copied() else {
                continue;
            };

            let others: Vec<Vec3> = all_subjects
                .iter()
                .filter(|s| s.id != id)
                .filter_map(|s| s.valid_pose().map(|p| p.origin))
                .collect();

            let distance = safe_distance(
                &snapshot,
                &others,
                self.config.distance,
                self.config.height,
                &self.config.tuning,
            );
            let target = compute_target(&snapshot, distance, &self.config, |origin, end, mask| {
                probe(&*host, origin, end, mask, Some(id))
            });

            session.age_ticks = session.age_ticks.saturating_add(1);
            let correction_due = match session
                .pending_corrections
                .iter()
                .position(|&tick| tick == session.age_ticks)
            {
                Some(index) => {
                    session.pending_corrections.remove(index);
                    true
                }
                None => false,
            };

            let handle = session.handle;
            let position = match session.mode {
                CameraMode::Instant => target.position,
                CameraMode::Smoothed => {
                    if correction_due {
                        // Settle correction: snap to the raw target and
                        // re-seed the filter from it.
                        self.smoothing.clear(id);
                    }
                    self.smoothing
                        .advance(id, target.position, &pose, now, &self.config.tuning)
                }
            };

            host.teleport_entity(handle, position, target.angles, Vec3::ZERO);
        }
    }

    /// Shared teardown used by deactivation and stale-session cleanup.
    /// Does not chat; callers decide whether an acknowledgment is owed.
    fn release_session(&mut self, host: &mut dyn Host, id: SubjectId, session: CameraSession) {
        host.set_view_entity(id, None);
        if host.entity_valid(session.handle) {
            host.destroy_entity(session.handle);
        }
        host.set_prevent_item_pickup(id, false);
        if let Some(items) = session.stored_items {
            for (item, count) in items {
                for _ in 0..count {
                    host.grant_item(id, &item);
                }
            }
        }
        self.smoothing.clear(id);
    }
}

/// Snapshot the subject's held item counts, block further pickups, and
/// remove everything. The returned list is restored on deactivation.
fn strip_items(host: &mut dyn Host, id: SubjectId) -> Vec<(String, u32)> {
    host.set_prevent_item_pickup(id, true);
    let mut counts: Vec<(String, u32)> = Vec::new();
    for item in host.held_items(id) {
        match counts.iter_mut().find(|(name, _)| *name == item) {
            Some((_, count)) => *count += 1,
            None => counts.push((item, 1)),
        }
    }
    host.remove_all_items(id);
    counts
}

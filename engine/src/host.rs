//! Host Simulation Interface
//!
//! Everything the camera system consumes from the surrounding simulation,
//! gathered in one trait: entity lifecycle for the camera prop, subject
//! enumeration, per-subject mutation (view target, health, items), chat
//! delivery, and permission checks. Ray casting lives on the [`RayProbe`]
//! supertrait so the target calculator can depend on probes alone.
//!
//! The camera system owns *when* a camera entity is created or destroyed;
//! the host owns *how*. All calls happen on the host's single frame /
//! command thread - no method here may block or re-enter the camera
//! system.

use glam::Vec3;

use crate::probe::RayProbe;
use crate::subject::{SubjectId, SubjectSnapshot, ViewAngles};

/// Opaque reference to a host-owned positionable viewpoint entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraHandle(pub u32);

/// Render color applied to a freshly spawned camera entity so the prop
/// itself never shows up on screen (white, alpha 0).
pub const CAMERA_TINT_INVISIBLE: [u8; 4] = [255, 255, 255, 0];

/// The host simulation's capabilities, as consumed by the camera system.
pub trait Host: RayProbe {
    // --- camera entity lifecycle ---

    /// Create (but do not spawn) a camera entity. `None` when the host
    /// cannot allocate one; activation aborts without a session.
    fn create_camera_entity(&mut self) -> Option<CameraHandle>;
    fn spawn_entity(&mut self, handle: CameraHandle);
    fn destroy_entity(&mut self, handle: CameraHandle);
    /// Whether the handle still refers to a live entity.
    fn entity_valid(&self, handle: CameraHandle) -> bool;
    /// Move an entity to a pose. The camera commits its result here every
    /// frame.
    fn teleport_entity(
        &mut self,
        handle: CameraHandle,
        position: Vec3,
        angles: ViewAngles,
        velocity: Vec3,
    );
    fn set_render_color(&mut self, handle: CameraHandle, rgba: [u8; 4]);

    // --- world queries ---

    /// All currently active subjects. Used for the camera-vs-subject
    /// proximity check, so it must include every subject with a body.
    fn subjects(&self) -> Vec<SubjectSnapshot>;
    /// Snapshot of one subject, `None` if it no longer exists.
    fn subject(&self, id: SubjectId) -> Option<SubjectSnapshot>;

    // --- per-subject mutation ---

    /// Route the subject's view through the given camera entity, or back
    /// to its own eyes when `None`.
    fn set_view_entity(&mut self, id: SubjectId, camera: Option<CameraHandle>);
    fn health(&self, id: SubjectId) -> i32;
    fn set_health(&mut self, id: SubjectId, health: i32);
    fn armor(&self, id: SubjectId) -> i32;
    fn set_armor(&mut self, id: SubjectId, armor: i32);
    fn set_prevent_item_pickup(&mut self, id: SubjectId, prevent: bool);
    /// Names of the items the subject currently holds, one entry per item
    /// (duplicates allowed).
    fn held_items(&self, id: SubjectId) -> Vec<String>;
    fn remove_all_items(&mut self, id: SubjectId);
    fn grant_item(&mut self, id: SubjectId, item: &str);

    // --- player-facing glue ---

    fn print_chat(&mut self, id: SubjectId, message: &str);
    fn has_permission(&self, id: SubjectId, flag: &str) -> bool;
}

//! Camera Positioning Core
//!
//! Two halves: [`target`] derives the ideal (raw) camera position for a
//! frame from the subject's pose and the world's geometry, and
//! [`smoothing`] low-pass-filters that raw target into the position
//! actually committed to the camera entity.

pub mod smoothing;
pub mod target;

pub use smoothing::{SmoothingState, SmoothingTracker};
pub use target::{TargetPose, compute_target, is_behind, position_in_front, safe_distance};

//! Chase Camera Engine
//!
//! A collision-aware, jitter-suppressed third-person camera for a host
//! simulation: every frame it derives a camera position behind and above
//! each tracked subject, keeps it out of world geometry and other
//! subjects' proximity zones, and low-pass-filters the result so the
//! camera glides instead of snapping.
//!
//! The host simulation (entities, ray casts, chat, permissions) sits
//! behind the [`host::Host`] trait; this crate is engine-agnostic and
//! never talks to a renderer or a network.
//!
//! # Modules
//!
//! - [`math`] - angle wrapping and yaw-derived direction vectors
//! - [`subject`] - per-frame snapshots of the followed entity
//! - [`probe`] - fail-open ray probing against world geometry
//! - [`config`] - behavior switches and named tuning constants
//! - [`camera`] - raw target derivation and per-subject smoothing
//! - [`session`] - session registry, command/event hooks, frame driver
//!
//! # Example
//!
//! ```ignore
//! use chasecam_engine::{CameraConfig, CameraSystem};
//!
//! let mut cameras = CameraSystem::new(CameraConfig::default());
//!
//! // Host command handler:
//! cameras.on_activation_command(&mut host, subject_id);
//!
//! // Host frame callback:
//! cameras.frame_update(&mut host, host_clock_seconds);
//!
//! // Host round-start event:
//! cameras.on_round_start();
//! ```

pub mod camera;
pub mod config;
pub mod host;
pub mod math;
pub mod probe;
pub mod session;
pub mod subject;

pub use camera::smoothing::{SmoothingState, SmoothingTracker};
pub use camera::target::TargetPose;
pub use config::{CameraConfig, ConfigError, TuningConfig};
pub use host::{CAMERA_TINT_INVISIBLE, CameraHandle, Host};
pub use probe::{ProbeMask, ProbeResult, RayProbe};
pub use session::{CameraMode, CameraSession, CameraSystem, ToggleOutcome};
pub use subject::{SubjectId, SubjectPose, SubjectSnapshot, ViewAngles};

//! Camera Configuration
//!
//! All behavior switches and tuning constants as a serde-backed config
//! struct. Every numeric constant that shapes camera motion lives in
//! [`TuningConfig`] as a named field rather than a literal buried in the
//! math, so one implementation covers every tuning variant.
//!
//! Config files are JSON. Missing fields fall back to defaults, so a file
//! containing only `{"distance": 90.0}` is valid.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Why a config file could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Top-level camera configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Chat command name that toggles the camera (registered by the host
    /// alongside the built-in name).
    pub command: String,
    /// Gate the toggle command behind `admin_flag`.
    pub admin_only: bool,
    /// Permission flag checked when `admin_only` is set.
    pub admin_flag: String,
    /// Pull the camera in front of occluding geometry. Disabling lets the
    /// camera clip through walls.
    pub block_camera: bool,
    /// Activate sessions in smoothed mode; otherwise the camera snaps to
    /// the raw target every frame.
    pub use_smooth: bool,
    /// Desired distance behind the subject, in world units.
    pub distance: f32,
    /// Vertical offset of the camera eye above the subject origin.
    pub height: f32,
    /// Strip held items on activation and restore them on deactivation.
    pub strip_on_use: bool,
    /// Prepended to every chat acknowledgment.
    pub chat_prefix: String,
    pub msg_activated: String,
    pub msg_deactivated: String,
    pub msg_no_permission: String,
    pub tuning: TuningConfig,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            command: "tp".to_string(),
            admin_only: false,
            admin_flag: "@css/slay".to_string(),
            block_camera: true,
            use_smooth: true,
            distance: 110.0,
            height: 76.0,
            strip_on_use: false,
            chat_prefix: "[ThirdPerson] ".to_string(),
            msg_activated: "Third person camera enabled.".to_string(),
            msg_deactivated: "Third person camera disabled.".to_string(),
            msg_no_permission: "You don't have permission to use this command.".to_string(),
            tuning: TuningConfig::default(),
        }
    }
}

impl CameraConfig {
    /// Parse a config from a JSON string. Missing fields use defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serialize to pretty JSON, e.g. for writing a default config file.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Motion tuning constants.
///
/// Distances and speeds are in world units (and units per second); ticks
/// are driver frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    /// Another subject's origin closer than this to a candidate camera
    /// point marks the candidate unsafe.
    pub proximity_radius: f32,
    /// Step size when walking the backward ray for the proximity check.
    pub proximity_step: f32,
    /// Margin kept between the camera and an occluding surface.
    pub occlusion_margin: f32,
    /// The occlusion clamp never pulls the camera closer than this to the
    /// subject's eye.
    pub min_camera_distance: f32,
    /// Ground probe starts this far above the unobstructed target point.
    pub ground_probe_rise: f32,
    /// Ground probe reaches this far below the unobstructed target point.
    pub ground_probe_depth: f32,
    /// Clearance kept between the camera and detected ground.
    pub ground_clearance: f32,
    /// Absolute camera-Z floor above the subject origin, applied whether
    /// or not the ground probe hit.
    pub floor_margin: f32,
    /// A final position within this radius of the subject origin falls
    /// back to the fixed behind-and-above offset.
    pub degenerate_radius: f32,
    /// Lower bound of the smoothing blend factor (stability when idle).
    pub blend_min: f32,
    /// Upper bound of the smoothing blend factor (responsiveness cap).
    pub blend_max: f32,
    /// Blend factor gained per unit of horizontal speed.
    pub blend_horizontal_response: f32,
    /// Blend factor gained per unit of vertical speed.
    pub blend_vertical_response: f32,
    /// Allowed camera-Z change per second scales with subject vertical
    /// speed by this factor...
    pub z_rate_gain: f32,
    /// ...plus this baseline, so the camera can still settle vertically
    /// while the subject stands still.
    pub z_rate_floor: f32,
    /// Smoothed camera Z stays within this band above the subject origin.
    pub min_height_above: f32,
    pub max_height_above: f32,
    /// Smoothed camera distance from the subject stays within this band.
    pub min_follow_distance: f32,
    pub max_follow_distance: f32,
    /// Driver ticks (counted from activation) at which the camera is
    /// re-committed to the raw target, masking the host's first-frame
    /// attach glitch.
    pub settle_ticks: Vec<u32>,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            proximity_radius: 8.0,
            proximity_step: 10.0,
            occlusion_margin: 10.0,
            min_camera_distance: 10.0,
            ground_probe_rise: 16.0,
            ground_probe_depth: 64.0,
            ground_clearance: 8.0,
            floor_margin: 8.0,
            degenerate_radius: 8.0,
            blend_min: 0.05,
            blend_max: 0.5,
            blend_horizontal_response: 0.001,
            blend_vertical_response: 0.0008,
            z_rate_gain: 1.5,
            z_rate_floor: 32.0,
            min_height_above: 24.0,
            max_height_above: 110.0,
            min_follow_distance: 16.0,
            max_follow_distance: 160.0,
            settle_ticks: vec![1, 32],
        }
    }
}

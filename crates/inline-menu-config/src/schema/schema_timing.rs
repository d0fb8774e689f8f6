//! Timing configuration: debounce windows and geometry probing.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Debounce and throttle windows of the event pipeline, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebounceConfig {
    /// Trailing debounce for scroll/resize repositioning.
    #[serde(default = "default_reposition_ms")]
    pub reposition_ms: u64,

    /// Leading throttle for sub-frame offset rebuilds.
    #[serde(default = "default_rebuild_sub_frame_ms")]
    pub rebuild_sub_frame_ms: u64,

    /// Trailing debounce for position pushes after a rebuild.
    #[serde(default = "default_position_update_ms")]
    pub position_update_ms: u64,

    /// Trailing debounce before the surfaces are faded in.
    #[serde(default = "default_fade_in_ms")]
    pub fade_in_ms: u64,
}

impl DebounceConfig {
    pub fn reposition(&self) -> Duration {
        Duration::from_millis(self.reposition_ms)
    }

    pub fn rebuild_sub_frame(&self) -> Duration {
        Duration::from_millis(self.rebuild_sub_frame_ms)
    }

    pub fn position_update(&self) -> Duration {
        Duration::from_millis(self.position_update_ms)
    }

    pub fn fade_in(&self) -> Duration {
        Duration::from_millis(self.fade_in_ms)
    }
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            reposition_ms: default_reposition_ms(),
            rebuild_sub_frame_ms: default_rebuild_sub_frame_ms(),
            position_update_ms: default_position_update_ms(),
            fade_in_ms: default_fade_in_ms(),
        }
    }
}

fn default_reposition_ms() -> u64 {
    1000
}

fn default_rebuild_sub_frame_ms() -> u64 {
    100
}

fn default_position_update_ms() -> u64 {
    150
}

fn default_fade_in_ms() -> u64 {
    150
}

/// Sub-frame geometry resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryConfig {
    /// Deepest ancestry chain walked before an offset is declared unresolved.
    #[serde(default = "default_max_sub_frame_depth")]
    pub max_sub_frame_depth: usize,

    /// Upper bound on a single frame probe round-trip.
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

impl GeometryConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            max_sub_frame_depth: default_max_sub_frame_depth(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

fn default_max_sub_frame_depth() -> usize {
    8
}

fn default_probe_timeout_ms() -> u64 {
    2000
}

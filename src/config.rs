//! Browser settings, resolved by the host before the browser is created.

use anyhow::{Context, Result};
use camino::Utf8Path;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Key the host maps to [`crate::Browser::toggle`].
    pub toggle_key: String,
    /// Distance in front of the player at which spawned items appear.
    pub spawn_distance: f32,
    /// Allow spawning while connected to an online session.
    pub allow_online_spawn: bool,
    /// Emit per-record diagnostics (fallback categories, icon traces, build summary).
    pub verbose: bool,
    /// Records cataloged per tick.
    pub build_batch: usize,
    /// Rows emitted per tick.
    pub list_batch: usize,
    /// Resolve heavy icons in the background while the browser is closed.
    pub prewarm_icons: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            toggle_key: "F4".to_string(),
            spawn_distance: 1.5,
            allow_online_spawn: true,
            verbose: false,
            build_batch: 4,
            list_batch: 10,
            prewarm_icons: true,
        }
    }
}

impl BrowserConfig {
    /// Parse a JSON config; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse browser config")
    }

    pub fn load(path: &Utf8Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
        Self::from_json_str(&text).with_context(|| format!("Invalid config {}", path))
    }
}

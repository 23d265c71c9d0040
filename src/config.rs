// SPDX-License-Identifier: GPL-3.0-only

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::compose::{RenderingPolicy, ViewRotation};
use crate::frame::Size;
use crate::source::TestPattern;

/// Persisted preview settings
///
/// Loaded at startup and written back when the preview exits, so toggles
/// made with the runtime keys survive to the next run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Source rate in frames per second
    pub fps: u32,
    /// How frames are composited
    pub policy: RenderingPolicy,
    /// Rotation applied on the view-optimized path
    pub rotation: ViewRotation,
    /// Whether the fps/latency overlay starts enabled
    pub fps_meter: bool,
    /// Pattern for the built-in source
    pub pattern: TestPattern,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fps: 30,
            policy: RenderingPolicy::default(),
            rotation: ViewRotation::default(),
            fps_meter: true,
            pattern: TestPattern::default(),
        }
    }
}

impl PreviewConfig {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Load the config, falling back to defaults on any failure
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            warn!("No config directory available, using defaults");
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    debug!(path = %path.display(), "Loaded config");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Config unreadable, using defaults");
                    Self::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Config unreadable, using defaults");
                Self::default()
            }
        }
    }

    /// Write the config to disk, creating the directory if needed
    pub fn save(&self) -> std::io::Result<()> {
        let Some(path) = config_path() else {
            return Err(std::io::Error::other("no config directory available"));
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(&path, contents)?;
        debug!(path = %path.display(), "Saved config");
        Ok(())
    }
}

/// Path of the config file, `~/.config/viewfinder/config.json` on Linux
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("viewfinder").join("config.json"))
}

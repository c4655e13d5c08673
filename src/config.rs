// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::{FlipMethod, permission, pipeline};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Native pipeline settings handed to the bridge
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Source element factory (e.g. "ahcsrc", "videotestsrc")
    pub source: String,
    /// Requested capture width
    pub width: u32,
    /// Requested capture height
    pub height: u32,
    /// Rotation between camera and display
    pub flip: FlipMethod,
    /// Sink element factory; must implement `GstVideoOverlay`
    pub sink: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            source: pipeline::DEFAULT_SOURCE.to_string(),
            width: pipeline::DEFAULT_WIDTH,
            height: pipeline::DEFAULT_HEIGHT,
            flip: FlipMethod::default(),
            sink: pipeline::DEFAULT_SINK.to_string(),
        }
    }
}

impl PipelineSettings {
    /// `gst-launch` style description for these settings
    pub fn launch_description(&self) -> String {
        format!(
            "{} ! video/x-raw,width={},height={} ! videoflip method={} ! videoconvert ! {} name={}",
            self.source,
            self.width,
            self.height,
            self.flip.gst_name(),
            self.sink,
            pipeline::SINK_NAME
        )
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.source.trim().is_empty() || self.sink.trim().is_empty() {
            return Err(AppError::Config(
                "Pipeline source and sink must be set".to_string(),
            ));
        }
        if self.width == 0 || self.height == 0 {
            return Err(AppError::Config(format!(
                "Invalid capture size {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Native pipeline settings
    pub pipeline: PipelineSettings,
    /// Finish the activity when camera permission is denied
    pub exit_on_denial: bool,
    /// Request code used for the camera permission dialog
    pub permission_request_code: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pipeline: PipelineSettings::default(),
            exit_on_denial: false, // Denial only updates the status line
            permission_request_code: permission::REQUEST_CODE,
        }
    }
}

impl Config {
    /// `<config dir>/camera-shell/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("camera-shell").join("config.json"))
    }

    /// Read and validate a config file
    pub fn load(path: &Path) -> AppResult<Self> {
        debug!(path = %path.display(), "Loading config");
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.pipeline.validate()?;
        Ok(config)
    }

    /// Like [`load`](Self::load), but falls back to defaults on any error
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => {
                info!(path = %path.display(), "Loaded config");
                config
            }
            Err(AppError::Storage(e)) => {
                debug!(path = %path.display(), error = %e, "No readable config, using defaults");
                Self::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Invalid config, using defaults");
                Self::default()
            }
        }
    }

    /// Write the config as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        debug!(path = %path.display(), "Saved config");
        Ok(())
    }
}

// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use serde::{Deserialize, Serialize};

/// Version string baked in by `build.rs`
pub const VERSION: &str = env!("GIT_VERSION");

/// Rotation applied by the `videoflip` element between source and sink
///
/// Android camera sensors are usually mounted landscape, so portrait
/// activities rotate the preview clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlipMethod {
    /// No rotation
    None,
    /// Rotate 90 degrees clockwise (default)
    #[default]
    Clockwise,
    /// Rotate 180 degrees
    RotateHalf,
    /// Rotate 90 degrees counter-clockwise
    CounterClockwise,
    /// Mirror horizontally (selfie preview)
    HorizontalFlip,
    /// Follow the orientation tag reported by the source
    Automatic,
}

impl FlipMethod {
    /// All variants, for settings UIs
    pub const ALL: [FlipMethod; 6] = [
        FlipMethod::None,
        FlipMethod::Clockwise,
        FlipMethod::RotateHalf,
        FlipMethod::CounterClockwise,
        FlipMethod::HorizontalFlip,
        FlipMethod::Automatic,
    ];

    /// Value of the `method` property understood by `videoflip`
    pub fn gst_name(&self) -> &'static str {
        match self {
            FlipMethod::None => "none",
            FlipMethod::Clockwise => "clockwise",
            FlipMethod::RotateHalf => "rotate-180",
            FlipMethod::CounterClockwise => "counterclockwise",
            FlipMethod::HorizontalFlip => "horizontal-flip",
            FlipMethod::Automatic => "automatic",
        }
    }
}

/// Pipeline defaults
pub mod pipeline {
    /// Android camera source element (androidmedia plugin)
    pub const DEFAULT_SOURCE: &str = "ahcsrc";

    /// GL sink that renders into the native window
    pub const DEFAULT_SINK: &str = "glimagesink";

    /// Name given to the sink in the launch line so it can be looked up
    pub const SINK_NAME: &str = "videosink";

    /// Requested capture width
    pub const DEFAULT_WIDTH: u32 = 1280;

    /// Requested capture height
    pub const DEFAULT_HEIGHT: u32 = 720;
}

/// Timing constants
pub mod timing {
    /// Pipeline playing state timeout on start
    pub const START_TIMEOUT_SECS: u64 = 5;

    /// Pipeline state change timeout on stop
    pub const STOP_TIMEOUT_SECS: u64 = 2;

    /// How long the bus watcher blocks per poll before re-checking its stop flag
    pub const BUS_POLL_MS: u64 = 100;
}

/// Runtime permission request
pub mod permission {
    /// The single capability this shell asks for
    pub const CAMERA: &str = "android.permission.CAMERA";

    /// Request code passed to `requestPermissions`
    pub const REQUEST_CODE: i32 = 1;
}

/// User-visible status lines
pub mod status {
    pub const SURFACE_READY: &str = "Surface ready. Starting pipeline...";
    pub const SURFACE_DESTROYED: &str = "Surface destroyed. Stopping pipeline...";
    pub const PERMISSION_REQUIRED: &str = "Camera permission required.";
    pub const WAITING_FOR_PERMISSION: &str = "Waiting for camera permission...";
    pub const WAITING_FOR_SURFACE: &str = "Permission granted. Waiting for surface...";
    pub const RUNNING: &str = "Pipeline running";
    pub const STOPPED: &str = "Pipeline stopped";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_method_gst_names_are_unique() {
        let mut names: Vec<_> = FlipMethod::ALL.iter().map(|m| m.gst_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FlipMethod::ALL.len());
    }
}

// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the camera shell

use crate::lifecycle::SurfaceId;
use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Result type for native bridge calls
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
    /// The lifecycle dispatcher thread is gone
    Queue(String),
}

/// Errors reported by a [`NativePipelineBridge`](crate::bridge::NativePipelineBridge)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// Native runtime (GStreamer) could not be initialized
    NotInitialized(String),
    /// Launch line could not be parsed or built
    PipelineCreation(String),
    /// Video sink missing or not an overlay
    SinkUnavailable(String),
    /// Surface was invalidated before the bridge could use it
    InvalidSurface(SurfaceId),
    /// Pipeline refused a state change
    StateChange(String),
    /// Other errors
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Queue(msg) => write!(f, "Event queue error: {}", msg),
        }
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::NotInitialized(msg) => write!(f, "Native runtime not initialized: {}", msg),
            BridgeError::PipelineCreation(msg) => write!(f, "Failed to create pipeline: {}", msg),
            BridgeError::SinkUnavailable(msg) => write!(f, "Video sink unavailable: {}", msg),
            BridgeError::InvalidSurface(id) => write!(f, "Surface {} is no longer valid", id),
            BridgeError::StateChange(msg) => write!(f, "Pipeline state change failed: {}", msg),
            BridgeError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for BridgeError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

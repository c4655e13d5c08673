// SPDX-License-Identifier: GPL-3.0-only

//! Camera shell - surface and permission lifecycle around a native pipeline
//!
//! An Android activity owns a drawable surface and asks for camera
//! permission; the native side renders the camera into that surface with
//! GStreamer. This crate decides exactly when a pipeline may be created and
//! guarantees it is destroyed before its surface goes away.
//!
//! # Architecture
//!
//! - [`lifecycle`]: the controller state machine, plus mutex and
//!   event-queue front ends for multi-threaded hosts
//! - [`bridge`]: the native pipeline boundary and the GStreamer bridge
//! - [`host`]: adapter from activity callbacks to controller messages
//! - [`config`]: pipeline settings and host policy
//! - [`logging`]: tracing subscriber setup for the native library

pub mod bridge;
pub mod config;
pub mod constants;
pub mod errors;
pub mod host;
pub mod lifecycle;
pub mod logging;

// Re-export commonly used types
pub use bridge::NativePipelineBridge;
pub use config::{Config, PipelineSettings};
pub use errors::{AppError, AppResult, BridgeError, BridgeResult};
pub use host::{ActivityHost, HostAction};
pub use lifecycle::{
    Condition, ControllerPhase, EventQueue, EventSender, LifecycleController, LifecycleEvent,
    PermissionState, SharedController, SurfaceHandle, SurfaceId,
};

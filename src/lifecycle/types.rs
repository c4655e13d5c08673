// SPDX-License-Identifier: GPL-3.0-only

//! Value types shared by the lifecycle controller and its collaborators

use crate::errors::BridgeError;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

static NEXT_SURFACE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a host surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(u64);

impl SurfaceId {
    fn next() -> Self {
        SurfaceId(NEXT_SURFACE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// A platform-owned drawable target
///
/// Every call to [`SurfaceHandle::new`] yields a fresh identity. Clones share
/// the validity flag, so invalidating any clone invalidates all of them, and
/// an invalidated handle never becomes valid again.
#[derive(Debug, Clone)]
pub struct SurfaceHandle {
    id: SurfaceId,
    /// Raw native window pointer (e.g. `ANativeWindow*`) handed to the video sink
    window: usize,
    valid: Arc<AtomicBool>,
}

impl SurfaceHandle {
    /// Wrap a native window the host has just made available
    pub fn new(window: usize) -> Self {
        Self {
            id: SurfaceId::next(),
            window,
            valid: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    /// Native window handle to bind a video overlay to
    pub fn window(&self) -> usize {
        self.window
    }

    pub fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Acquire)
    }

    /// Mark the surface destroyed; idempotent
    pub fn invalidate(&self) {
        self.valid.store(false, Ordering::Release);
    }

    /// Whether both handles refer to the same surface identity
    pub fn same_surface(&self, other: &SurfaceHandle) -> bool {
        self.id == other.id
    }
}

/// Tri-state grant record for the camera capability
///
/// Only `Unknown -> Granted` and `Unknown -> Denied` are legal transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionState {
    #[default]
    Unknown,
    Granted,
    Denied,
}

impl PermissionState {
    /// Map a platform grant result
    pub fn from_granted(granted: bool) -> Self {
        if granted {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PermissionState::Unknown)
    }

    /// Apply a result, returning the new state if the transition is legal
    pub fn transition(self, result: PermissionState) -> Option<PermissionState> {
        match (self, result) {
            (PermissionState::Unknown, PermissionState::Unknown) => None,
            (PermissionState::Unknown, next) => Some(next),
            _ => None,
        }
    }
}

/// A live native pipeline bound to exactly one surface
///
/// Not `Clone`: the controller is the sole owner, and the only way to get the
/// native pipeline back out is [`PipelineHandle::into_native`], which consumes
/// the handle on its way to `destroy`.
#[derive(Debug)]
pub struct PipelineHandle<P> {
    surface: SurfaceHandle,
    native: P,
}

impl<P> PipelineHandle<P> {
    pub(crate) fn new(surface: SurfaceHandle, native: P) -> Self {
        Self { surface, native }
    }

    /// Identity of the surface this pipeline renders into
    pub fn surface_id(&self) -> SurfaceId {
        self.surface.id()
    }

    pub(crate) fn surface(&self) -> &SurfaceHandle {
        &self.surface
    }

    pub(crate) fn native(&self) -> &P {
        &self.native
    }

    pub(crate) fn into_native(self) -> P {
        self.native
    }
}

/// Derived controller phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPhase {
    /// No surface
    Idle,
    /// Surface present, permission not yet answered
    AwaitingPermission,
    /// Permission denied (with or without a surface)
    Denied,
    /// Pipeline live on the current surface
    Running,
    /// Surface present and permission granted, but the last start failed
    Stalled,
}

impl fmt::Display for ControllerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControllerPhase::Idle => "idle",
            ControllerPhase::AwaitingPermission => "awaiting-permission",
            ControllerPhase::Denied => "denied",
            ControllerPhase::Running => "running",
            ControllerPhase::Stalled => "stalled",
        };
        f.write_str(name)
    }
}

/// Conditions the controller reports to the host instead of failing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Camera permission denied; terminal for this permission instance
    PermissionDenied,
    /// Bridge `create` failed; no automatic retry
    StartFailed {
        surface: SurfaceId,
        error: BridgeError,
    },
    /// Bridge `destroy` failed; the pipeline is forgotten anyway
    StopFailed {
        surface: SurfaceId,
        error: BridgeError,
    },
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::PermissionDenied => write!(f, "Camera permission required."),
            Condition::StartFailed { error, .. } => write!(f, "Failed to start pipeline: {}", error),
            Condition::StopFailed { error, .. } => write!(f, "Failed to stop pipeline: {}", error),
        }
    }
}

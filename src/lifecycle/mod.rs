// SPDX-License-Identifier: GPL-3.0-only

//! Surface/permission lifecycle controller
//!
//! The controller is the single authority on whether a native pipeline may
//! exist. It consumes two unordered event streams (surface lifecycle and the
//! permission result) and turns them into `create`/`destroy` calls on a
//! [`NativePipelineBridge`].
//!
//! Whenever a pipeline exists, the surface it was created against is the
//! current surface, that surface is still valid, and permission is granted.
//! Every path that invalidates one of those stops the pipeline first.
//!
//! The controller itself is single-threaded (`&mut self`). Hosts that deliver
//! callbacks from several threads go through [`SharedController`] (mutex) or
//! [`EventQueue`] (one dispatcher thread).

pub mod queue;
pub mod shared;
pub mod types;

pub use queue::{EventQueue, EventSender};
pub use shared::SharedController;
pub use types::*;

use crate::bridge::NativePipelineBridge;
use tracing::{debug, error, info, warn};

/// Callback receiving every reported [`Condition`]
pub type ConditionListener = Box<dyn FnMut(&Condition) + Send>;

/// Inbound host events, in message form
#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    SurfaceAvailable(SurfaceHandle),
    SurfaceReconfigured {
        surface: SurfaceHandle,
        width: u32,
        height: u32,
    },
    SurfaceDestroyed(SurfaceHandle),
    PermissionResult(PermissionState),
    Shutdown,
}

/// Reactive state machine over (surface, permission) driving the bridge
pub struct LifecycleController<B: NativePipelineBridge> {
    bridge: B,
    surface: Option<SurfaceHandle>,
    permission: PermissionState,
    pipeline: Option<PipelineHandle<B::Pipeline>>,
    listener: Option<ConditionListener>,
    last_condition: Option<Condition>,
}

impl<B: NativePipelineBridge> LifecycleController<B> {
    pub fn new(bridge: B) -> Self {
        Self {
            bridge,
            surface: None,
            permission: PermissionState::Unknown,
            pipeline: None,
            listener: None,
            last_condition: None,
        }
    }

    /// Builder form of [`set_listener`](Self::set_listener)
    pub fn with_listener(mut self, listener: impl FnMut(&Condition) + Send + 'static) -> Self {
        self.set_listener(listener);
        self
    }

    /// Install the callback that receives every reported [`Condition`]
    ///
    /// The listener runs inside the transition that raised the condition:
    /// under the [`SharedController`] lock, or on the [`EventQueue`]
    /// dispatcher thread. Calling back into that `SharedController`, or
    /// waiting on [`EventSender::surface_destroyed`], from the listener
    /// deadlocks. Hand the condition off (e.g. over a channel) instead.
    pub fn set_listener(&mut self, listener: impl FnMut(&Condition) + Send + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Apply one event
    pub fn dispatch(&mut self, event: LifecycleEvent) {
        match event {
            LifecycleEvent::SurfaceAvailable(surface) => self.on_surface_available(surface),
            LifecycleEvent::SurfaceReconfigured {
                surface,
                width,
                height,
            } => self.on_surface_reconfigured(&surface, width, height),
            LifecycleEvent::SurfaceDestroyed(surface) => self.on_surface_destroyed(&surface),
            LifecycleEvent::PermissionResult(state) => self.on_permission_result(state),
            LifecycleEvent::Shutdown => self.shutdown(),
        }
    }

    /// A drawable became available
    ///
    /// If a pipeline is still live on an older surface, the host skipped the
    /// destroyed callback; that pipeline is stopped before anything else.
    pub fn on_surface_available(&mut self, surface: SurfaceHandle) {
        if !surface.is_valid() {
            debug!(surface = %surface.id(), "Ignoring surface-available for an invalidated surface");
            return;
        }
        if let Some(current) = &self.surface
            && current.same_surface(&surface)
        {
            debug!(surface = %surface.id(), "Ignoring duplicate surface-available");
            return;
        }

        info!(surface = %surface.id(), permission = ?self.permission, "Surface available");

        if let Some(pipeline) = &self.pipeline {
            warn!(
                stale = %pipeline.surface_id(),
                new = %surface.id(),
                "New surface while a pipeline is live; stopping stale pipeline first"
            );
            self.stop_pipeline();
        }

        // A new surface means the previous one is gone, reported or not
        if let Some(previous) = self.surface.replace(surface) {
            previous.invalidate();
        }

        if self.permission == PermissionState::Granted {
            self.start_pipeline();
        } else {
            debug!(permission = ?self.permission, "Not starting pipeline yet");
        }
    }

    /// Output geometry of a surface changed
    ///
    /// Forwarded to the bridge only if a pipeline is live on that surface.
    pub fn on_surface_reconfigured(&mut self, surface: &SurfaceHandle, width: u32, height: u32) {
        debug!(surface = %surface.id(), width, height, "Surface reconfigured");

        match &self.pipeline {
            Some(pipeline) if pipeline.surface_id() == surface.id() => {
                if let Err(e) = self.bridge.reconfigure(pipeline.native(), width, height) {
                    warn!(surface = %surface.id(), error = %e, "Pipeline rejected new geometry");
                }
            }
            _ => debug!("No pipeline on this surface; geometry change not forwarded"),
        }
    }

    /// The drawable is about to be destroyed
    ///
    /// Returns only after any pipeline bound to it has been destroyed.
    pub fn on_surface_destroyed(&mut self, surface: &SurfaceHandle) {
        let is_current = self
            .surface
            .as_ref()
            .is_some_and(|current| current.same_surface(surface));
        if !is_current {
            debug!(surface = %surface.id(), "Ignoring stale surface-destroyed");
            return;
        }

        info!(surface = %surface.id(), "Surface destroyed");
        self.stop_pipeline();

        if let Some(current) = self.surface.take() {
            current.invalidate();
        }
    }

    /// The permission dialog answered
    pub fn on_permission_result(&mut self, result: PermissionState) {
        let Some(next) = self.permission.transition(result) else {
            debug!(
                current = ?self.permission,
                result = ?result,
                "Ignoring permission result; permission already settled"
            );
            return;
        };
        self.permission = next;

        match next {
            PermissionState::Granted => {
                info!("Camera permission granted");
                if self.surface.is_some() && self.pipeline.is_none() {
                    self.start_pipeline();
                } else {
                    debug!("Waiting for a surface before starting pipeline");
                }
            }
            PermissionState::Denied => {
                warn!("Camera permission denied");
                self.report(Condition::PermissionDenied);
            }
            PermissionState::Unknown => {}
        }
    }

    /// Start a fresh permission flow after a denial
    ///
    /// Replaces a `Denied` record with a new `Unknown` one. Returns `false`
    /// and changes nothing if permission is not currently denied.
    pub fn renew_permission(&mut self) -> bool {
        if self.permission != PermissionState::Denied {
            return false;
        }
        debug!("Renewing denied camera permission");
        self.permission = PermissionState::Unknown;
        true
    }

    /// Stop everything and forget all state; safe to call repeatedly
    pub fn shutdown(&mut self) {
        if self.pipeline.is_none() && self.surface.is_none() {
            debug!("Shutdown with nothing running");
        } else {
            info!("Shutting down lifecycle controller");
        }
        self.stop_pipeline();
        self.surface = None;
        self.permission = PermissionState::Unknown;
    }

    /// Current derived phase
    pub fn phase(&self) -> ControllerPhase {
        match (&self.surface, self.permission, &self.pipeline) {
            (_, _, Some(_)) => ControllerPhase::Running,
            (_, PermissionState::Denied, None) => ControllerPhase::Denied,
            (None, _, None) => ControllerPhase::Idle,
            (Some(_), PermissionState::Unknown, None) => ControllerPhase::AwaitingPermission,
            (Some(_), PermissionState::Granted, None) => ControllerPhase::Stalled,
        }
    }

    pub fn is_running(&self) -> bool {
        self.pipeline.is_some()
    }

    pub fn permission(&self) -> PermissionState {
        self.permission
    }

    pub fn current_surface(&self) -> Option<&SurfaceHandle> {
        self.surface.as_ref()
    }

    /// Surface the live pipeline renders into, if any
    pub fn pipeline_surface(&self) -> Option<SurfaceId> {
        self.pipeline.as_ref().map(PipelineHandle::surface_id)
    }

    /// Whether the live pipeline's surface is still valid; `true` when idle
    pub fn pipeline_surface_valid(&self) -> bool {
        self.pipeline
            .as_ref()
            .is_none_or(|pipeline| pipeline.surface().is_valid())
    }

    /// Most recently reported condition
    pub fn last_condition(&self) -> Option<&Condition> {
        self.last_condition.as_ref()
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut B {
        &mut self.bridge
    }

    fn start_pipeline(&mut self) {
        let Some(surface) = self.surface.clone() else {
            return;
        };

        if !surface.is_valid() {
            debug!(surface = %surface.id(), "Current surface was invalidated by the host; dropping it");
            self.surface = None;
            return;
        }

        info!(surface = %surface.id(), window = surface.window(), "Starting pipeline");
        match self.bridge.create(&surface) {
            Ok(native) => {
                info!(surface = %surface.id(), "Pipeline started");
                self.pipeline = Some(PipelineHandle::new(surface, native));
            }
            Err(error) => {
                error!(surface = %surface.id(), error = %error, "Failed to start pipeline");
                self.report(Condition::StartFailed {
                    surface: surface.id(),
                    error,
                });
            }
        }
    }

    fn stop_pipeline(&mut self) {
        // Taken before the bridge call so a failed destroy still leaves no pipeline
        let Some(pipeline) = self.pipeline.take() else {
            return;
        };
        let surface = pipeline.surface_id();

        info!(surface = %surface, "Stopping pipeline");
        match self.bridge.destroy(pipeline.into_native()) {
            Ok(()) => info!(surface = %surface, "Pipeline stopped"),
            Err(error) => {
                warn!(surface = %surface, error = %error, "Pipeline destroy reported an error");
                self.report(Condition::StopFailed { surface, error });
            }
        }
    }

    fn report(&mut self, condition: Condition) {
        if let Some(listener) = self.listener.as_mut() {
            listener(&condition);
        }
        self.last_condition = Some(condition);
    }
}

impl<B: NativePipelineBridge> Drop for LifecycleController<B> {
    fn drop(&mut self) {
        if self.pipeline.is_some() {
            warn!("Lifecycle controller dropped with a live pipeline; stopping it");
            self.stop_pipeline();
        }
    }
}

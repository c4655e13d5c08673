// SPDX-License-Identifier: GPL-3.0-only

//! Host activity adapter
//!
//! Turns the platform's callbacks (activity creation, `SurfaceHolder`
//! callbacks, the permission dialog result, activity destruction) into
//! controller messages, and keeps the status line the activity shows.
//! Anything the platform has to do in response comes back as a
//! [`HostAction`].

use crate::bridge::NativePipelineBridge;
use crate::config::Config;
use crate::constants::{permission, status};
use crate::errors::BridgeResult;
use crate::lifecycle::{
    ControllerPhase, LifecycleController, PermissionState, SharedController, SurfaceHandle,
    SurfaceId,
};
use tracing::{debug, error, info};

/// What the platform layer must do after a callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostAction {
    /// Nothing
    None,
    /// Show the runtime permission dialog
    RequestPermission {
        permission: &'static str,
        request_code: i32,
    },
    /// Finish the activity
    Finish,
}

/// Activity-side glue around a shared [`LifecycleController`]
pub struct ActivityHost<B: NativePipelineBridge> {
    controller: SharedController<B>,
    config: Config,
    surface: Option<SurfaceHandle>,
    status: String,
}

impl<B: NativePipelineBridge> ActivityHost<B> {
    pub fn new(bridge: B, config: Config) -> Self {
        Self::with_controller(SharedController::new(LifecycleController::new(bridge)), config)
    }

    /// Build from a bridge that may have failed to come up
    ///
    /// A bridge error (typically GStreamer failing to initialize) leaves
    /// nothing to drive, so the platform is told to finish the activity.
    pub fn try_new(bridge: BridgeResult<B>, config: Config) -> Result<Self, HostAction> {
        match bridge {
            Ok(bridge) => Ok(Self::new(bridge, config)),
            Err(e) => {
                error!(error = %e, "Native pipeline bridge unavailable; finishing activity");
                Err(HostAction::Finish)
            }
        }
    }

    pub fn with_controller(controller: SharedController<B>, config: Config) -> Self {
        Self {
            controller,
            config,
            surface: None,
            status: String::new(),
        }
    }

    /// Activity created; `permission_granted` is the result of the self-check
    pub fn on_create(&mut self, permission_granted: bool) -> HostAction {
        info!(permission_granted, "Activity created");
        if permission_granted {
            self.controller.on_permission_result(PermissionState::Granted);
            self.refresh_status();
            HostAction::None
        } else {
            self.status = status::WAITING_FOR_PERMISSION.to_string();
            HostAction::RequestPermission {
                permission: permission::CAMERA,
                request_code: self.config.permission_request_code,
            }
        }
    }

    /// `surfaceCreated`: the native window is ready to draw into
    pub fn surface_created(&mut self, window: usize) -> SurfaceId {
        let surface = SurfaceHandle::new(window);
        debug!(surface = %surface.id(), window, "Surface created");
        self.status = status::SURFACE_READY.to_string();

        self.controller.on_surface_available(surface.clone());
        let id = surface.id();
        self.surface = Some(surface);
        self.refresh_status();
        id
    }

    /// `surfaceChanged`: geometry or pixel format changed
    pub fn surface_changed(&mut self, format: i32, width: u32, height: u32) {
        debug!(format, width, height, "Surface changed");
        match &self.surface {
            Some(surface) => self
                .controller
                .on_surface_reconfigured(surface, width, height),
            None => debug!("Surface changed without a current surface; ignoring"),
        }
    }

    /// `surfaceDestroyed`: returns once the pipeline has let go of the surface
    pub fn surface_destroyed(&mut self) {
        debug!("Surface destroyed");

        match self.surface.take() {
            Some(surface) => self.controller.on_surface_destroyed(&surface),
            None => debug!("Surface destroyed without a current surface; ignoring"),
        }
        self.refresh_status();
        // Idle after a destroy keeps the destroy notice
        if self.phase() == ControllerPhase::Idle {
            self.status = status::SURFACE_DESTROYED.to_string();
        }
    }

    /// `onRequestPermissionsResult`
    pub fn on_request_permissions_result(
        &mut self,
        request_code: i32,
        grant_results: &[bool],
    ) -> HostAction {
        if request_code != self.config.permission_request_code {
            debug!(request_code, "Ignoring result for another permission request");
            return HostAction::None;
        }

        let granted = grant_results.first().copied().unwrap_or(false);
        self.controller
            .on_permission_result(PermissionState::from_granted(granted));
        self.refresh_status();

        if !granted && self.config.exit_on_denial {
            info!("Camera permission denied; finishing activity");
            return HostAction::Finish;
        }
        HostAction::None
    }

    /// Activity destroyed: stop everything
    pub fn on_destroy(&mut self) {
        info!("Activity destroyed");
        self.controller.shutdown();
        self.surface = None;
        self.status = status::STOPPED.to_string();
    }

    /// Line to show in the activity's status view
    pub fn status_text(&self) -> &str {
        &self.status
    }

    pub fn phase(&self) -> ControllerPhase {
        self.controller.phase()
    }

    pub fn controller(&self) -> &SharedController<B> {
        &self.controller
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Derive the status line from the controller phase; `Idle` keeps the
    /// current line unless permission is already granted.
    fn refresh_status(&mut self) {
        let controller = self.controller.lock();
        let text = match controller.phase() {
            ControllerPhase::Running => status::RUNNING.to_string(),
            ControllerPhase::Denied => status::PERMISSION_REQUIRED.to_string(),
            ControllerPhase::AwaitingPermission => status::WAITING_FOR_PERMISSION.to_string(),
            ControllerPhase::Stalled => controller
                .last_condition()
                .map(ToString::to_string)
                .unwrap_or_else(|| self.status.clone()),
            ControllerPhase::Idle if controller.permission() == PermissionState::Granted => {
                status::WAITING_FOR_SURFACE.to_string()
            }
            ControllerPhase::Idle => self.status.clone(),
        };
        drop(controller);
        self.status = text;
    }
}

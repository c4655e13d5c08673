// SPDX-License-Identifier: GPL-3.0-only

//! Thread-safe controller access
//!
//! Hosts that call in from more than one thread (UI thread for surface
//! callbacks, a binder thread for the permission result) share one
//! controller behind a mutex, so each operation runs to completion before
//! the next one starts.

use super::{ControllerPhase, LifecycleController, LifecycleEvent, PermissionState, SurfaceHandle};
use crate::bridge::NativePipelineBridge;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Clonable, mutex-serialized handle to a [`LifecycleController`]
pub struct SharedController<B: NativePipelineBridge> {
    inner: Arc<Mutex<LifecycleController<B>>>,
}

impl<B: NativePipelineBridge> Clone for SharedController<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: NativePipelineBridge> SharedController<B> {
    pub fn new(controller: LifecycleController<B>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(controller)),
        }
    }

    /// Lock the controller for several operations in a row
    ///
    /// A panic inside a previous holder does not leave the controller
    /// half-updated, so a poisoned lock is recovered rather than propagated.
    pub fn lock(&self) -> MutexGuard<'_, LifecycleController<B>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn dispatch(&self, event: LifecycleEvent) {
        self.lock().dispatch(event);
    }

    pub fn on_surface_available(&self, surface: SurfaceHandle) {
        self.lock().on_surface_available(surface);
    }

    pub fn on_surface_reconfigured(&self, surface: &SurfaceHandle, width: u32, height: u32) {
        self.lock().on_surface_reconfigured(surface, width, height);
    }

    /// Blocks until any pipeline on `surface` has been destroyed
    pub fn on_surface_destroyed(&self, surface: &SurfaceHandle) {
        self.lock().on_surface_destroyed(surface);
    }

    pub fn on_permission_result(&self, state: PermissionState) {
        self.lock().on_permission_result(state);
    }

    pub fn renew_permission(&self) -> bool {
        self.lock().renew_permission()
    }

    pub fn shutdown(&self) {
        self.lock().shutdown();
    }

    pub fn phase(&self) -> ControllerPhase {
        self.lock().phase()
    }

    pub fn is_running(&self) -> bool {
        self.lock().is_running()
    }
}

// SPDX-License-Identifier: GPL-3.0-only

//! Serialized event queue in front of the controller
//!
//! Both event sources post [`LifecycleEvent`]s into one channel. A single
//! dispatcher thread owns the controller and applies them in arrival order,
//! so no transition ever observes another one half-done.
//!
//! `surface_destroyed` waits for an acknowledgement: the host's destruction
//! callback must not return while a pipeline still renders into the surface.
//! The waiting calls use `blocking_recv` and must not be made from inside an
//! async task.

use super::{LifecycleController, LifecycleEvent, PermissionState, SurfaceHandle};
use crate::bridge::NativePipelineBridge;
use crate::errors::{AppError, AppResult};
use std::thread::JoinHandle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

struct Envelope {
    event: LifecycleEvent,
    ack: Option<oneshot::Sender<()>>,
}

/// Clonable posting side of an [`EventQueue`]
#[derive(Clone)]
pub struct EventSender {
    sender: mpsc::UnboundedSender<Envelope>,
}

impl EventSender {
    /// Enqueue without waiting for the event to be applied
    pub fn post(&self, event: LifecycleEvent) -> AppResult<()> {
        self.sender
            .send(Envelope { event, ack: None })
            .map_err(|_| AppError::Queue("Lifecycle dispatcher has stopped".to_string()))
    }

    /// Enqueue and block until the dispatcher has applied the event
    pub fn post_and_wait(&self, event: LifecycleEvent) -> AppResult<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.sender
            .send(Envelope {
                event,
                ack: Some(ack_tx),
            })
            .map_err(|_| AppError::Queue("Lifecycle dispatcher has stopped".to_string()))?;
        ack_rx
            .blocking_recv()
            .map_err(|_| AppError::Queue("Lifecycle dispatcher dropped the event".to_string()))
    }

    pub fn surface_available(&self, surface: SurfaceHandle) -> AppResult<()> {
        self.post(LifecycleEvent::SurfaceAvailable(surface))
    }

    pub fn surface_reconfigured(
        &self,
        surface: SurfaceHandle,
        width: u32,
        height: u32,
    ) -> AppResult<()> {
        self.post(LifecycleEvent::SurfaceReconfigured {
            surface,
            width,
            height,
        })
    }

    /// Blocks until any pipeline on `surface` has been destroyed
    pub fn surface_destroyed(&self, surface: SurfaceHandle) -> AppResult<()> {
        self.post_and_wait(LifecycleEvent::SurfaceDestroyed(surface))
    }

    pub fn permission_result(&self, state: PermissionState) -> AppResult<()> {
        self.post(LifecycleEvent::PermissionResult(state))
    }
}

/// Owner of the dispatcher thread
pub struct EventQueue<B: NativePipelineBridge> {
    sender: EventSender,
    dispatcher: Option<JoinHandle<LifecycleController<B>>>,
}

impl<B> EventQueue<B>
where
    B: NativePipelineBridge + Send + 'static,
    B::Pipeline: Send + 'static,
{
    /// Move `controller` onto a new dispatcher thread
    pub fn spawn(controller: LifecycleController<B>) -> AppResult<Self> {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Envelope>();

        let dispatcher = std::thread::Builder::new()
            .name("lifecycle-events".to_string())
            .spawn(move || {
                let mut controller = controller;
                while let Some(Envelope { event, ack }) = receiver.blocking_recv() {
                    let is_shutdown = matches!(event, LifecycleEvent::Shutdown);
                    controller.dispatch(event);
                    if let Some(ack) = ack {
                        let _ = ack.send(());
                    }
                    if is_shutdown {
                        break;
                    }
                }
                debug!("Lifecycle dispatcher exiting");
                controller
            })
            .map_err(|e| AppError::Queue(format!("Spawn dispatcher thread: {}", e)))?;

        info!("Lifecycle event queue started");

        Ok(Self {
            sender: EventSender { sender },
            dispatcher: Some(dispatcher),
        })
    }

    /// A posting handle for another event source
    pub fn sender(&self) -> EventSender {
        self.sender.clone()
    }

    /// Shut the controller down and hand it back once the queue has drained
    pub fn shutdown(mut self) -> AppResult<LifecycleController<B>> {
        let dispatcher = self
            .dispatcher
            .take()
            .ok_or_else(|| AppError::Queue("Dispatcher already joined".to_string()))?;

        // Fails only if the dispatcher already exited, which join reports below
        let _ = self.sender.post(LifecycleEvent::Shutdown);

        dispatcher
            .join()
            .map_err(|_| AppError::Queue("Lifecycle dispatcher panicked".to_string()))
    }
}

impl<B: NativePipelineBridge> Drop for EventQueue<B> {
    fn drop(&mut self) {
        if let Some(dispatcher) = self.dispatcher.take() {
            let _ = self.sender.post(LifecycleEvent::Shutdown);
            if let Err(e) = dispatcher.join() {
                error!("Lifecycle dispatcher panicked: {:?}", e);
            }
        }
    }
}

// SPDX-License-Identifier: GPL-3.0-only

//! Recording bridge shared by the integration tests

#![allow(dead_code)]

use camera_shell::{BridgeError, BridgeResult, NativePipelineBridge, SurfaceHandle, SurfaceId};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One bridge call, in the order it was made
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(SurfaceId),
    Destroy(SurfaceId),
    Reconfigure(SurfaceId, u32, u32),
}

/// Pipeline returned by [`RecordingBridge`]
pub struct RecordedPipeline {
    surface: SurfaceHandle,
}

/// Bridge that records calls and checks the controller's guarantees
///
/// Clones share the same log, so a test can keep one clone while the
/// controller owns another.
#[derive(Clone, Default)]
pub struct RecordingBridge {
    calls: Arc<Mutex<Vec<Call>>>,
    violations: Arc<Mutex<Vec<String>>>,
    live: Arc<AtomicUsize>,
    fail_create: Arc<AtomicBool>,
    fail_destroy: Arc<AtomicBool>,
    fail_reconfigure: Arc<AtomicBool>,
}

impl RecordingBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn creates(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Create(_)))
            .count()
    }

    pub fn destroys(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Destroy(_)))
            .count()
    }

    /// Pipelines created and not yet destroyed
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Broken guarantees seen so far (double pipelines, destroy after invalidation)
    pub fn violations(&self) -> Vec<String> {
        self.violations.lock().unwrap().clone()
    }

    pub fn set_fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_destroy(&self, fail: bool) {
        self.fail_destroy.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_reconfigure(&self, fail: bool) {
        self.fail_reconfigure.store(fail, Ordering::SeqCst);
    }

    fn violation(&self, message: String) {
        self.violations.lock().unwrap().push(message);
    }
}

impl NativePipelineBridge for RecordingBridge {
    type Pipeline = RecordedPipeline;

    fn create(&mut self, surface: &SurfaceHandle) -> BridgeResult<RecordedPipeline> {
        if !surface.is_valid() {
            self.violation(format!("create on invalidated {}", surface.id()));
        }
        if self.live() > 0 {
            self.violation(format!("create on {} while a pipeline is live", surface.id()));
        }
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(BridgeError::PipelineCreation(
                "no element \"ahcsrc\"".to_string(),
            ));
        }

        self.calls.lock().unwrap().push(Call::Create(surface.id()));
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(RecordedPipeline {
            surface: surface.clone(),
        })
    }

    fn destroy(&mut self, pipeline: RecordedPipeline) -> BridgeResult<()> {
        if !pipeline.surface.is_valid() {
            self.violation(format!(
                "destroy after {} was invalidated",
                pipeline.surface.id()
            ));
        }

        self.calls
            .lock()
            .unwrap()
            .push(Call::Destroy(pipeline.surface.id()));
        self.live.fetch_sub(1, Ordering::SeqCst);

        if self.fail_destroy.load(Ordering::SeqCst) {
            return Err(BridgeError::StateChange(
                "Failed to stop pipeline: state change failed".to_string(),
            ));
        }
        Ok(())
    }

    fn reconfigure(
        &mut self,
        pipeline: &RecordedPipeline,
        width: u32,
        height: u32,
    ) -> BridgeResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Reconfigure(pipeline.surface.id(), width, height));

        if self.fail_reconfigure.load(Ordering::SeqCst) {
            return Err(BridgeError::Other(
                "Failed to set render rectangle".to_string(),
            ));
        }
        Ok(())
    }
}

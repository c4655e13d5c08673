// SPDX-License-Identifier: GPL-3.0-only

//! GStreamer bridge rendering the camera into the host surface

use super::NativePipelineBridge;
use crate::config::PipelineSettings;
use crate::constants::{pipeline as pipeline_consts, timing};
use crate::errors::{BridgeError, BridgeResult};
use crate::lifecycle::{SurfaceHandle, SurfaceId};
use gstreamer::prelude::*;
use gstreamer_video::VideoOverlay;
use gstreamer_video::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use tracing::{debug, error, info, warn};

/// Bridge that builds `source ! videoflip ! videoconvert ! sink` per surface
pub struct GStreamerBridge {
    settings: PipelineSettings,
}

impl GStreamerBridge {
    /// Initialize GStreamer and validate the settings
    pub fn new(settings: PipelineSettings) -> BridgeResult<Self> {
        settings
            .validate()
            .map_err(|e| BridgeError::PipelineCreation(e.to_string()))?;

        debug!("Initializing GStreamer");
        gstreamer::init().map_err(|e| BridgeError::NotInitialized(e.to_string()))?;
        info!(version = %gstreamer::version_string(), "GStreamer initialized");

        Ok(Self { settings })
    }
}

impl NativePipelineBridge for GStreamerBridge {
    type Pipeline = GStreamerPipeline;

    fn create(&mut self, surface: &SurfaceHandle) -> BridgeResult<GStreamerPipeline> {
        GStreamerPipeline::new(&self.settings, surface)
    }

    fn destroy(&mut self, mut pipeline: GStreamerPipeline) -> BridgeResult<()> {
        pipeline.teardown()
    }

    fn reconfigure(
        &mut self,
        pipeline: &GStreamerPipeline,
        width: u32,
        height: u32,
    ) -> BridgeResult<()> {
        pipeline.set_render_size(width, height)
    }
}

/// One running pipeline and the bus watcher attached to it
pub struct GStreamerPipeline {
    pipeline: gstreamer::Pipeline,
    overlay: VideoOverlay,
    surface: SurfaceId,
    bus_stop: Arc<AtomicBool>,
    bus_thread: Option<JoinHandle<()>>,
    torn_down: bool,
}

impl GStreamerPipeline {
    fn new(settings: &PipelineSettings, surface: &SurfaceHandle) -> BridgeResult<Self> {
        if !surface.is_valid() {
            return Err(BridgeError::InvalidSurface(surface.id()));
        }

        let description = settings.launch_description();
        info!(surface = %surface.id(), pipeline = %description, "Creating GStreamer pipeline");

        let pipeline = gstreamer::parse::launch(&description)
            .map_err(|e| {
                error!(error = %e, pipeline = %description, "Failed to parse pipeline");
                BridgeError::PipelineCreation(e.to_string())
            })?
            .dynamic_cast::<gstreamer::Pipeline>()
            .map_err(|_| {
                BridgeError::PipelineCreation("Launch line did not produce a pipeline".to_string())
            })?;

        let overlay = pipeline
            .by_name(pipeline_consts::SINK_NAME)
            .ok_or_else(|| {
                BridgeError::SinkUnavailable(format!(
                    "No element named {}",
                    pipeline_consts::SINK_NAME
                ))
            })?
            .dynamic_cast::<VideoOverlay>()
            .map_err(|_| {
                BridgeError::SinkUnavailable(format!(
                    "{} does not implement GstVideoOverlay",
                    settings.sink
                ))
            })?;

        // SAFETY: the window pointer comes from a surface the controller has
        // checked is valid, and the controller destroys this pipeline before
        // acknowledging that surface's destruction.
        unsafe {
            overlay.set_window_handle(surface.window());
        }
        debug!(surface = %surface.id(), window = surface.window(), "Video overlay bound to surface");

        let bus = pipeline
            .bus()
            .ok_or_else(|| BridgeError::PipelineCreation("No bus on pipeline".to_string()))?;
        let bus_stop = Arc::new(AtomicBool::new(false));
        let bus_thread = spawn_bus_watch(bus, Arc::clone(&bus_stop), surface.id())?;

        // From here on, early returns tear down through Drop
        let this = Self {
            pipeline,
            overlay,
            surface: surface.id(),
            bus_stop,
            bus_thread: Some(bus_thread),
            torn_down: false,
        };

        debug!("Setting pipeline to PLAYING state");
        this.pipeline
            .set_state(gstreamer::State::Playing)
            .map_err(|e| {
                error!(surface = %this.surface, error = %e, "Failed to set pipeline to PLAYING");
                BridgeError::StateChange(format!("Failed to start pipeline: {}", e))
            })?;

        let (result, state, pending) = this.pipeline.state(gstreamer::ClockTime::from_seconds(
            timing::START_TIMEOUT_SECS,
        ));
        debug!(result = ?result, state = ?state, pending = ?pending, "Pipeline state");
        if result.is_err() {
            return Err(BridgeError::StateChange(format!(
                "Pipeline failed to reach PLAYING (state: {:?}, pending: {:?})",
                state, pending
            )));
        }
        if state != gstreamer::State::Playing {
            // Camera sources often finish prerolling asynchronously
            warn!(state = ?state, pending = ?pending, "Pipeline is not in PLAYING state yet");
        }

        info!(surface = %this.surface, "GStreamer pipeline playing");
        Ok(this)
    }

    /// Surface this pipeline renders into
    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    fn set_render_size(&self, width: u32, height: u32) -> BridgeResult<()> {
        let to_i32 = |v: u32| {
            i32::try_from(v).map_err(|_| BridgeError::Other(format!("Dimension {} out of range", v)))
        };
        self.overlay
            .set_render_rectangle(0, 0, to_i32(width)?, to_i32(height)?)
            .map_err(|e| BridgeError::Other(format!("Failed to set render rectangle: {}", e)))?;
        self.overlay.expose();
        debug!(surface = %self.surface, width, height, "Render rectangle updated");
        Ok(())
    }

    /// Stop the pipeline and release the surface; runs once
    fn teardown(&mut self) -> BridgeResult<()> {
        if self.torn_down {
            return Ok(());
        }
        self.torn_down = true;

        info!(surface = %self.surface, "Stopping GStreamer pipeline");

        let result = self
            .pipeline
            .set_state(gstreamer::State::Null)
            .map(|_| ())
            .map_err(|e| BridgeError::StateChange(format!("Failed to stop pipeline: {}", e)));

        let (state_result, state, _) = self.pipeline.state(gstreamer::ClockTime::from_seconds(
            timing::STOP_TIMEOUT_SECS,
        ));
        match state_result {
            Ok(_) => debug!(state = ?state, "Pipeline reached NULL"),
            Err(e) => debug!(error = ?e, state = ?state, "Pipeline state change had issues"),
        }

        // SAFETY: the pipeline is in NULL, so the sink no longer touches the
        // window; a zero handle detaches it before the surface goes away.
        unsafe {
            self.overlay.set_window_handle(0);
        }

        self.bus_stop.store(true, Ordering::Release);
        if let Some(thread) = self.bus_thread.take()
            && let Err(e) = thread.join()
        {
            error!("Bus watch thread panicked: {:?}", e);
        }

        info!(surface = %self.surface, "GStreamer pipeline stopped");
        result
    }
}

impl Drop for GStreamerPipeline {
    fn drop(&mut self) {
        if !self.torn_down {
            debug!(surface = %self.surface, "Dropping GStreamer pipeline - explicitly stopping");
            let _ = self.teardown();
        }
    }
}

/// Log bus traffic until EOS, an error, or `stop` is raised
fn spawn_bus_watch(
    bus: gstreamer::Bus,
    stop: Arc<AtomicBool>,
    surface: SurfaceId,
) -> BridgeResult<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("gst-bus-watch".to_string())
        .spawn(move || {
            debug!(surface = %surface, "Bus watch started");
            while !stop.load(Ordering::Acquire) {
                let Some(msg) = bus.timed_pop(gstreamer::ClockTime::from_mseconds(
                    timing::BUS_POLL_MS,
                )) else {
                    continue;
                };

                use gstreamer::MessageView;
                match msg.view() {
                    MessageView::Eos(_) => {
                        info!(surface = %surface, "End of stream");
                        break;
                    }
                    MessageView::Error(err) => {
                        error!(
                            surface = %surface,
                            error = %err.error(),
                            debug = ?err.debug(),
                            source = ?err.src().map(|s| s.name()),
                            "GStreamer error"
                        );
                        break;
                    }
                    MessageView::Warning(warn_msg) => {
                        warn!(
                            surface = %surface,
                            warning = %warn_msg.error(),
                            debug = ?warn_msg.debug(),
                            "GStreamer warning"
                        );
                    }
                    _ => {}
                }
            }
            debug!(surface = %surface, "Bus watch exited");
        })
        .map_err(|e| BridgeError::Other(format!("Spawn bus watch thread: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_settings(sink: &str) -> PipelineSettings {
        PipelineSettings {
            source: "videotestsrc".to_string(),
            sink: sink.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_sink_without_overlay_is_rejected() {
        // Skip on machines without a GStreamer runtime
        let Ok(mut bridge) = GStreamerBridge::new(test_settings("fakesink")) else {
            return;
        };
        let surface = SurfaceHandle::new(0);
        match bridge.create(&surface) {
            Err(BridgeError::SinkUnavailable(_)) => {}
            Err(BridgeError::PipelineCreation(_)) => {} // plugins missing
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("fakesink cannot render into a surface"),
        }
    }

    #[test]
    fn test_invalid_surface_is_rejected_before_launch() {
        let Ok(mut bridge) = GStreamerBridge::new(test_settings("fakesink")) else {
            return;
        };
        let surface = SurfaceHandle::new(0);
        surface.invalidate();
        assert!(matches!(
            bridge.create(&surface),
            Err(BridgeError::InvalidSurface(id)) if id == surface.id()
        ));
    }
}

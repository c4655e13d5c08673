// SPDX-License-Identifier: GPL-3.0-only

//! Native pipeline bridge abstraction
//!
//! ```text
//! ┌─────────────────────┐
//! │  Host (activity)    │  ← surface + permission callbacks
//! └──────────┬──────────┘
//!            ▼
//! ┌─────────────────────┐
//! │ LifecycleController │  ← decides when a pipeline may exist
//! └──────────┬──────────┘
//!            ▼
//! ┌─────────────────────┐
//! │ NativePipelineBridge│  ← create / destroy / reconfigure
//! └──────────┬──────────┘
//!            ▼
//!       ┌─────────┐
//!       │GStreamer│  ← concrete implementation (feature "gstreamer")
//!       └─────────┘
//! ```

#[cfg(feature = "gstreamer")]
pub mod gst;

#[cfg(feature = "gstreamer")]
pub use gst::{GStreamerBridge, GStreamerPipeline};

use crate::errors::BridgeResult;
use crate::lifecycle::SurfaceHandle;

/// Boundary to the native media pipeline
///
/// All calls are blocking from the caller's point of view. Implementations
/// never see a surface the controller already knows to be invalid, and
/// `destroy` is always called before the surface a pipeline was created
/// against goes away.
pub trait NativePipelineBridge {
    /// Opaque native pipeline owned by the controller between `create` and `destroy`
    type Pipeline;

    /// Build a pipeline rendering into `surface` and start it
    fn create(&mut self, surface: &SurfaceHandle) -> BridgeResult<Self::Pipeline>;

    /// Stop the pipeline and release everything it holds, including the surface
    fn destroy(&mut self, pipeline: Self::Pipeline) -> BridgeResult<()>;

    /// Tell a live pipeline its output geometry changed
    ///
    /// Default is a no-op; the pipeline is never restarted for a geometry change.
    fn reconfigure(
        &mut self,
        _pipeline: &Self::Pipeline,
        _width: u32,
        _height: u32,
    ) -> BridgeResult<()> {
        Ok(())
    }
}

impl<B: NativePipelineBridge + ?Sized> NativePipelineBridge for Box<B> {
    type Pipeline = B::Pipeline;

    fn create(&mut self, surface: &SurfaceHandle) -> BridgeResult<Self::Pipeline> {
        (**self).create(surface)
    }

    fn destroy(&mut self, pipeline: Self::Pipeline) -> BridgeResult<()> {
        (**self).destroy(pipeline)
    }

    fn reconfigure(
        &mut self,
        pipeline: &Self::Pipeline,
        width: u32,
        height: u32,
    ) -> BridgeResult<()> {
        (**self).reconfigure(pipeline, width, height)
    }
}

//! Renderer crate for fragtoy, a fragment shader preview harness.
//!
//! A user fragment shader runs in one of two modes:
//!
//! ```text
//!   single pass:  user shader(currentTime) ─────────────────────▶ window
//!
//!   simulation:   ┌──▶ input ──▶ user shader(deltaTime) ──▶ output ──┐
//!                 │                                           │      │
//!                 │                      display program ◀────┘      │
//!                 │                             │                    │
//!                 └──────────── swap ◀──────────┼────────────────────┘
//!                                               ▼
//!                                             window
//! ```
//!
//! [`FrameOrchestrator`] owns the per-frame sequence and talks to the GPU
//! only through the [`RenderBackend`] trait, so the sequencing and the
//! ping-pong [`OffscreenTargetPair`] can be exercised without a device. The
//! `gpu` module is the wgpu implementation; [`Renderer::run`] wires it to a
//! winit window.

mod backend;
mod compile;
mod error;
mod frame;
mod gpu;
mod runtime;
mod targets;
mod types;
mod window;

pub use backend::{
    Destination, DrawCall, FrameStatus, PassClock, PassParams, Program, RenderBackend,
    TargetAllocator, TargetSpec, FULLSCREEN_QUAD, QUAD_VERTEX_COUNT,
};
pub use error::{GpuErrorKind, RenderError};
pub use frame::{FrameOrchestrator, FrameOutcome};
pub use runtime::{SystemTimeSource, TimeSample, TimeSource};
pub use targets::{seed_payload, OffscreenTargetPair, TargetSlot};
pub use types::{Antialiasing, Extent, FragmentProgram, RenderMode, RendererConfig};

/// Entry point that opens the preview window for a configured shader.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Blocks until the window is closed or a fatal error occurs.
    pub fn run(self) -> Result<(), RenderError> {
        window::run_window(self.config)
    }
}

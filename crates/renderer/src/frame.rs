//! Per-frame sequencing: time advance, simulation pass, display pass, swap.

use crate::backend::{
    Destination, DrawCall, FrameStatus, PassClock, PassParams, Program, RenderBackend,
};
use crate::error::RenderError;
use crate::runtime::TimeSource;
use crate::targets::OffscreenTargetPair;
use crate::types::RenderMode;

/// What happened during one call to [`FrameOrchestrator::render_frame`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    Presented {
        /// Zero-based index of the frame that was just presented.
        frame_index: u64,
        /// Seconds since the previous presented frame.
        delta_seconds: f32,
    },
    /// The back-end had no surface frame; timing and targets were left alone.
    Skipped,
}

pub struct FrameOrchestrator<B, S>
where
    B: RenderBackend,
{
    backend: B,
    clock: S,
    mode: RenderMode,
    targets: OffscreenTargetPair<B::Target>,
    previous_time: f64,
    frames: u64,
}

impl<B, S> FrameOrchestrator<B, S>
where
    B: RenderBackend,
    S: TimeSource,
{
    /// Prepares the loop: allocates the target pair when `mode` is
    /// [`RenderMode::Simulation`] and resets the clock.
    pub fn new(mut backend: B, mut clock: S, mode: RenderMode) -> Result<Self, RenderError> {
        let targets = match mode {
            RenderMode::Simulation => {
                let extent = backend.framebuffer_size();
                OffscreenTargetPair::create(&mut backend, extent)?
            }
            RenderMode::SinglePass => OffscreenTargetPair::empty(),
        };

        clock.reset();
        let previous_time = clock.sample().seconds;
        tracing::info!(?mode, "render loop ready");

        Ok(Self {
            backend,
            clock,
            mode,
            targets,
            previous_time,
            frames: 0,
        })
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn clock(&self) -> &S {
        &self.clock
    }

    pub fn targets(&self) -> &OffscreenTargetPair<B::Target> {
        &self.targets
    }

    /// Number of frames presented so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn render_frame(&mut self) -> Result<FrameOutcome, RenderError> {
        if self.backend.begin_frame()? == FrameStatus::Skipped {
            return Ok(FrameOutcome::Skipped);
        }

        let now = self.clock.sample().seconds;
        let delta = (now - self.previous_time) as f32;
        self.previous_time = now;

        let view_port_size = self.backend.framebuffer_size().as_view_port();

        match self.mode {
            RenderMode::Simulation => {
                let input = self.targets.input().ok_or(RenderError::TargetsReleased)?;
                let output = self.targets.output().ok_or(RenderError::TargetsReleased)?;

                self.backend.draw(&DrawCall {
                    program: Program::User,
                    sampled: Some(input),
                    destination: Destination::Target(output),
                    params: PassParams {
                        view_port_size,
                        clock: PassClock::Delta(delta),
                    },
                })?;
                self.backend.draw(&DrawCall {
                    program: Program::Display,
                    sampled: Some(output),
                    destination: Destination::Surface,
                    params: PassParams {
                        view_port_size,
                        clock: PassClock::None,
                    },
                })?;
            }
            RenderMode::SinglePass => {
                self.backend.draw(&DrawCall {
                    program: Program::User,
                    sampled: None,
                    destination: Destination::Surface,
                    params: PassParams {
                        view_port_size,
                        clock: PassClock::Current(now as f32),
                    },
                })?;
            }
        }

        self.backend.end_frame()?;

        if self.mode.is_simulation() {
            self.targets.swap();
        }

        let frame_index = self.frames;
        self.frames += 1;
        Ok(FrameOutcome::Presented {
            frame_index,
            delta_seconds: delta,
        })
    }

    /// Releases the target pair and hands the back-end back for teardown.
    pub fn shutdown(mut self) -> B {
        self.targets.destroy(&mut self.backend);
        tracing::debug!(frames = self.frames, "render loop shut down");
        self.backend
    }
}

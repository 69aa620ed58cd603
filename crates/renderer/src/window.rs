use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowBuilder;

use crate::compile::wrap_user_fragment;
use crate::error::RenderError;
use crate::frame::{FrameOrchestrator, FrameOutcome};
use crate::gpu::GpuState;
use crate::runtime::SystemTimeSource;
use crate::types::RendererConfig;

const STATS_INTERVAL: Duration = Duration::from_secs(1);

/// Presented/skipped frame counts over a rolling interval.
#[derive(Debug)]
struct FrameStats {
    window_start: Instant,
    presented: u32,
    skipped: u32,
    slowest_delta: f32,
}

impl FrameStats {
    fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            presented: 0,
            skipped: 0,
            slowest_delta: 0.0,
        }
    }

    fn record(&mut self, outcome: FrameOutcome) {
        match outcome {
            FrameOutcome::Presented { delta_seconds, .. } => {
                self.presented += 1;
                self.slowest_delta = self.slowest_delta.max(delta_seconds);
            }
            FrameOutcome::Skipped => self.skipped += 1,
        }
    }

    /// Returns frames per second once per interval and starts a new one.
    fn flush(&mut self, now: Instant) -> Option<f32> {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < STATS_INTERVAL {
            return None;
        }
        let fps = self.presented as f32 / elapsed.as_secs_f32();
        debug!(
            fps,
            skipped = self.skipped,
            slowest_frame_ms = self.slowest_delta * 1000.0,
            "render stats"
        );
        *self = Self::new(now);
        Some(fps)
    }
}

fn is_quit_key(event: &KeyEvent) -> bool {
    if event.state != ElementState::Pressed {
        return false;
    }
    match &event.logical_key {
        Key::Named(NamedKey::Escape) => true,
        Key::Character(value) => value.as_str().eq_ignore_ascii_case("q"),
        _ => false,
    }
}

/// Opens the preview window and drives frames until it closes.
pub(crate) fn run_window(config: RendererConfig) -> Result<(), RenderError> {
    let user_fragment = wrap_user_fragment(&config.fragment, config.mode)?;
    let event_loop = EventLoop::new().map_err(|err| RenderError::EventLoop(err.to_string()))?;

    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = WindowBuilder::new()
        .with_title(config.title.as_str())
        .with_inner_size(window_size)
        .with_resizable(!config.mode.is_simulation())
        .build(&event_loop)
        .map_err(|err| RenderError::Window(err.to_string()))?;
    let window = Arc::new(window);
    let window_id = window.id();

    let backend = GpuState::new(window.clone(), &config, &user_fragment)?;
    let mut orchestrator = FrameOrchestrator::new(backend, SystemTimeSource::new(), config.mode)?;
    info!(
        shader = %config.fragment.label,
        mode = ?orchestrator.mode(),
        msaa = orchestrator.backend().sample_count(),
        "renderer initialised"
    );

    let mut stats = FrameStats::new(Instant::now());
    let mut failure: Option<RenderError> = None;

    let run_result = event_loop.run(|event, elwt| match event {
        Event::WindowEvent {
            window_id: id,
            event,
        } if id == window_id => match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => elwt.exit(),
            WindowEvent::KeyboardInput { event, .. } if is_quit_key(&event) => elwt.exit(),
            WindowEvent::Resized(new_size) => orchestrator.backend_mut().resize(new_size),
            WindowEvent::RedrawRequested => {
                if failure.is_some() {
                    return;
                }
                match orchestrator.render_frame() {
                    Ok(outcome) => {
                        stats.record(outcome);
                        stats.flush(Instant::now());
                    }
                    Err(err) => {
                        error!(error = %err, "rendering failed; closing window");
                        failure = Some(err);
                        elwt.exit();
                    }
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            window.request_redraw();
            elwt.set_control_flow(ControlFlow::Wait);
        }
        _ => {}
    });

    let frames = orchestrator.frames();
    drop(orchestrator.shutdown());
    info!(frames, "preview window closed");

    if let Some(err) = failure {
        return Err(err);
    }
    run_result.map_err(|err| RenderError::EventLoop(err.to_string()))
}

//! The seam between frame orchestration and the GPU.
//!
//! Nothing in here relies on ambient "currently bound" state: every draw is a
//! self-contained [`DrawCall`] naming its program, the texture it samples, the
//! destination it writes and the parameter values it needs. The wgpu back-end
//! in `gpu` is one implementation; tests drive the orchestrator through a CPU
//! fake.

use crate::error::RenderError;
use crate::types::Extent;

/// Corners of the full-screen quad in clip space, in triangle-strip order.
///
/// Four vertices covering `[-1, 1]²`. This is the same quad a four-vertex
/// triangle fan would describe, reordered for a strip.
pub const FULLSCREEN_QUAD: [[f32; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0], [1.0, 1.0]];

/// Number of vertices issued by every draw.
pub const QUAD_VERTEX_COUNT: u32 = FULLSCREEN_QUAD.len() as u32;

/// Describes one offscreen target to allocate.
#[derive(Debug, Clone, Copy)]
pub struct TargetSpec<'a> {
    /// Debug label, also used in validation errors.
    pub label: &'a str,
    pub extent: Extent,
    /// Optional initial RGBA32F contents, one entry per pixel in row-major order.
    pub initial: Option<&'a [[f32; 4]]>,
}

/// Allocation and release of offscreen targets.
///
/// Targets are `Rgba32Float`, sampled with nearest filtering and usable both
/// as a render attachment and as a sampled texture.
pub trait TargetAllocator {
    type Target;

    fn allocate_target(&mut self, spec: &TargetSpec<'_>) -> Result<Self::Target, RenderError>;

    /// Checks that an allocated target is complete and can be drawn into.
    fn validate_target(&mut self, target: &Self::Target) -> Result<(), RenderError>;

    /// Detaches and frees every resource owned by the target.
    fn release_target(&mut self, target: Self::Target);
}

/// Programs the harness can draw with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Program {
    /// The user's fragment shader.
    User,
    /// Built-in program that maps simulation values to displayable colors.
    Display,
}

/// Time value supplied to a pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PassClock {
    /// `currentTime`: seconds since the loop started.
    Current(f32),
    /// `deltaTime`: seconds since the previous frame.
    Delta(f32),
    None,
}

/// Uniform values for one pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassParams {
    pub view_port_size: [f32; 2],
    pub clock: PassClock,
}

/// Where a draw writes its fragments.
#[derive(Debug)]
pub enum Destination<'a, T> {
    /// The window surface acquired for the current frame.
    Surface,
    Target(&'a T),
}

impl<T> Clone for Destination<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Destination<'_, T> {}

/// One full-screen quad draw with its complete binding context.
#[derive(Debug)]
pub struct DrawCall<'a, T> {
    pub program: Program,
    /// Texture bound to sampler unit 0, if any.
    pub sampled: Option<&'a T>,
    pub destination: Destination<'a, T>,
    pub params: PassParams,
}

/// Result of trying to start a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Ready,
    /// No surface frame was available (lost, outdated or timed out); nothing
    /// should be drawn this iteration.
    Skipped,
}

/// Everything the orchestrator needs from a GPU.
pub trait RenderBackend: TargetAllocator {
    /// Current size of the visible surface.
    fn framebuffer_size(&self) -> Extent;

    fn begin_frame(&mut self) -> Result<FrameStatus, RenderError>;

    fn draw(&mut self, call: &DrawCall<'_, Self::Target>) -> Result<(), RenderError>;

    /// Submits the recorded passes and presents the surface.
    fn end_frame(&mut self) -> Result<(), RenderError>;
}

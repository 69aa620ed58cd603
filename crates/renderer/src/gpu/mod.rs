//! wgpu back-end for the frame orchestrator.
//!
//! - `context` owns instance/device/surface wiring, picks the surface format
//!   and MSAA sample count, and collects asynchronous device errors.
//! - `pipeline` turns wrapped GLSL into render pipelines over a shared
//!   full-screen quad vertex stage.
//! - `uniforms` mirrors the injected parameter block.
//! - `state` implements [`crate::backend::RenderBackend`] on top of the above.

mod context;
mod pipeline;
mod state;
mod uniforms;

pub(crate) use state::GpuState;

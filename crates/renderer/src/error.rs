use std::fmt;

use thiserror::Error;

/// Classifies errors reported by the GPU driver while the harness is running.
///
/// Every kind is fatal today; the split only exists so logs and callers can
/// tell a lost device apart from an invalid call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuErrorKind {
    Validation,
    OutOfMemory,
    Internal,
    DeviceLost,
}

impl fmt::Display for GpuErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuErrorKind::Validation => f.write_str("validation error"),
            GpuErrorKind::OutOfMemory => f.write_str("out of memory"),
            GpuErrorKind::Internal => f.write_str("internal error"),
            GpuErrorKind::DeviceLost => f.write_str("device lost"),
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to initialize event loop: {0}")]
    EventLoop(String),

    #[error("failed to create window: {0}")]
    Window(String),

    #[error("failed to create rendering surface: {0}")]
    Surface(String),

    #[error("failed to find a suitable GPU adapter: {0}")]
    Adapter(String),

    #[error("failed to create GPU device: {0}")]
    Device(String),

    #[error("shader compilation failed for {label}:\n{log}")]
    ShaderCompile { label: String, log: String },

    #[error("shader {label} does not fit its render mode: {reason}")]
    ShaderInputs { label: String, reason: String },

    #[error("offscreen target '{label}' is incomplete: {reason}")]
    TargetValidation { label: String, reason: String },

    #[error("simulation targets were used after being released")]
    TargetsReleased,

    #[error("draw issued outside of a frame")]
    FrameNotStarted,

    #[error("failed to acquire the next surface frame: {0}")]
    FrameAcquire(String),

    #[error("GPU {kind}: {message}")]
    Gpu { kind: GpuErrorKind, message: String },
}

impl RenderError {
    pub(crate) fn gpu(kind: GpuErrorKind, message: impl Into<String>) -> Self {
        RenderError::Gpu {
            kind,
            message: message.into(),
        }
    }

    /// Returns true when the error originated from the GPU driver at run time.
    pub fn is_gpu_fault(&self) -> bool {
        matches!(self, RenderError::Gpu { .. })
    }
}

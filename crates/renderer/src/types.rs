/// Width and height of a drawable area in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels covered by the extent.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Dimensions as the `viewPortSize` shader parameter expects them.
    pub fn as_view_port(&self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }
}

/// How frames are produced for the active shader.
///
/// * `SinglePass` runs the user shader straight onto the window surface with
///   the absolute `currentTime`.
/// * `Simulation` advances a ping-pong pair of offscreen targets with the
///   user shader (fed `deltaTime`) and shows the result through the built-in
///   display program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    SinglePass,
    Simulation,
}

impl RenderMode {
    pub fn from_state_texture(samples_state: bool) -> Self {
        if samples_state {
            RenderMode::Simulation
        } else {
            RenderMode::SinglePass
        }
    }

    pub fn is_simulation(&self) -> bool {
        matches!(self, RenderMode::Simulation)
    }
}

/// Anti-aliasing policy for passes that draw to the window surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Antialiasing {
    /// Pick the highest sample count supported by the surface format.
    Auto,
    /// Disable MSAA and render directly into the swapchain.
    Off,
    /// Request a specific MSAA sample count (clamped to what the device supports).
    Samples(u32),
}

impl Default for Antialiasing {
    fn default() -> Self {
        Self::Samples(8)
    }
}

/// Fragment shader handed to the renderer, already read from disk.
#[derive(Debug, Clone)]
pub struct FragmentProgram {
    /// Name used in GPU labels and compiler diagnostics.
    pub label: String,
    /// Desktop GLSL source as the user wrote it.
    pub source: String,
}

/// Immutable configuration passed to the renderer at start-up.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Initial window size in physical pixels.
    pub surface_size: (u32, u32),
    /// Window title.
    pub title: String,
    /// User fragment shader.
    pub fragment: FragmentProgram,
    /// Single-pass or ping-pong simulation.
    pub mode: RenderMode,
    /// Anti-aliasing mode for surface passes.
    pub antialiasing: Antialiasing,
    /// Pace presentation to the display refresh rate.
    pub vsync: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            surface_size: (800, 600),
            title: "Shadertoy".to_string(),
            fragment: FragmentProgram {
                label: String::new(),
                source: String::new(),
            },
            mode: RenderMode::SinglePass,
            antialiasing: Antialiasing::default(),
            vsync: true,
        }
    }
}

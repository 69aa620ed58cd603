use anyhow::{Context, Result};
use renderer::{FragmentProgram, RenderMode, Renderer, RendererConfig};
use shadersource::{load_fragment_shader, CapabilityOrigin, FragmentShader};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

pub fn run(cli: Cli) -> Result<()> {
    let shader = load_fragment_shader(&cli.shader)
        .with_context(|| format!("failed to load shader {}", cli.shader.display()))?;
    tracing::info!(
        shader = %shader.path.display(),
        state_texture = shader.capabilities.state_texture,
        from_manifest = shader.capabilities.origin == CapabilityOrigin::Manifest,
        "loaded fragment shader"
    );

    let renderer = Renderer::new(renderer_config(&cli, shader));
    tracing::debug!(
        mode = ?renderer.config().mode,
        antialiasing = ?renderer.config().antialiasing,
        vsync = renderer.config().vsync,
        "starting renderer"
    );
    renderer.run().context("renderer exited with an error")
}

fn renderer_config(cli: &Cli, shader: FragmentShader) -> RendererConfig {
    RendererConfig {
        fragment: FragmentProgram {
            label: shader.display_name(),
            source: shader.source,
        },
        mode: RenderMode::from_state_texture(shader.capabilities.state_texture),
        antialiasing: cli.antialias,
        vsync: !cli.no_vsync,
        ..RendererConfig::default()
    }
}

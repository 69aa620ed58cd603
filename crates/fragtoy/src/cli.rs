use std::path::PathBuf;

use clap::Parser;
use renderer::Antialiasing;

pub const DEFAULT_SHADER: &str = "shaders/roots.frag";

#[derive(Parser, Debug)]
#[command(
    name = "fragtoy",
    author,
    version,
    about = "Preview a GLSL fragment shader, optionally as a ping-pong simulation"
)]
pub struct Cli {
    /// Fragment shader to run. A sidecar `.toml` with the same stem may
    /// declare whether it reads the previous simulation state.
    #[arg(value_name = "SHADER", default_value = DEFAULT_SHADER)]
    pub shader: PathBuf,

    /// MSAA for passes drawn to the window: `auto`, `off`, or 2/4/8/16.
    #[arg(
        long,
        value_name = "SAMPLES",
        value_parser = parse_antialias,
        default_value = "8"
    )]
    pub antialias: Antialiasing,

    /// Present as fast as possible instead of waiting for vertical sync.
    #[arg(long)]
    pub no_vsync: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_antialias(value: &str) -> Result<Antialiasing, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("anti-alias mode must not be empty".to_string());
    }

    let normalized = trimmed.to_ascii_lowercase();
    match normalized.as_str() {
        "auto" | "max" => Ok(Antialiasing::Auto),
        "off" | "none" => Ok(Antialiasing::Off),
        _ => {
            let samples: u32 = normalized.parse().map_err(|_| {
                format!("invalid anti-alias sample count '{trimmed}'; use auto/off or 2/4/8/16")
            })?;
            match samples {
                0 | 1 => Ok(Antialiasing::Off),
                2 | 4 | 8 | 16 => Ok(Antialiasing::Samples(samples)),
                _ => Err(format!(
                    "unsupported sample count {samples}; supported values are 2, 4, 8, or 16"
                )),
            }
        }
    }
}

use std::borrow::Cow;
use std::fmt::Write as _;

use shadersource::{parse_uniform_declaration, strip_comments};
use wgpu::naga::ShaderStage;

use crate::backend::FULLSCREEN_QUAD;
use crate::error::RenderError;
use crate::types::{FragmentProgram, RenderMode};

/// Which coordinate origin the wrapped shader should observe in `gl_FragCoord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FragCoordOrigin {
    /// Desktop GL convention. Used by programs that draw to the window.
    BottomLeft,
    /// wgpu's native origin, so texel rows match fragment rows in offscreen passes.
    TopLeft,
}

/// A user fragment shader rewritten for wgpu's GLSL front-end.
#[derive(Debug, Clone)]
pub(crate) struct WrappedFragment {
    pub source: String,
    /// The shader declared a `sampler2D` that is bound to the state texture.
    pub samples_state: bool,
}

/// Built-in program for the display pass: maps the simulation's angle pair
/// from `[-π, π]` onto `[0, 1]`, wrapping values that drift outside.
pub(crate) const DISPLAY_FRAGMENT_GLSL: &str = r"#version 420
uniform vec2 viewPortSize;
uniform sampler2D simulationState;
out vec4 fragColor;

const float PI = 3.1415926535897932384626433832795;

void main() {
    vec4 state = texture(simulationState, gl_FragCoord.xy / viewPortSize);
    vec2 mapped = fract((state.xy + PI) / (2.0 * PI));
    fragColor = vec4(mapped, 0.5 + 0.5 * sin(state.z), 1.0);
}
";

/// Compiles the static full-screen quad vertex shader.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> Result<wgpu::ShaderModule, RenderError> {
    compile_glsl(
        device,
        "fullscreen quad vertex",
        vertex_shader_source(),
        ShaderStage::Vertex,
    )
}

/// Compiles an already wrapped fragment shader, capturing the compiler log.
pub(crate) fn compile_fragment_shader(
    device: &wgpu::Device,
    label: &str,
    wrapped: &WrappedFragment,
) -> Result<wgpu::ShaderModule, RenderError> {
    compile_glsl(device, label, wrapped.source.clone(), ShaderStage::Fragment)
}

fn compile_glsl(
    device: &wgpu::Device,
    label: &str,
    source: String,
    stage: ShaderStage,
) -> Result<wgpu::ShaderModule, RenderError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(source),
            stage,
            defines: &[],
        },
    });
    if let Some(error) = pollster::block_on(device.pop_error_scope()) {
        let log = error.to_string();
        tracing::error!(shader = label, "shader compilation failed:\n{log}");
        return Err(RenderError::ShaderCompile {
            label: label.to_string(),
            log,
        });
    }
    Ok(module)
}

/// Wraps the user program for `mode`, rejecting shaders whose inputs do not
/// fit it: a simulation must sample the previous state and a single pass has
/// no state to sample.
pub(crate) fn wrap_user_fragment(
    program: &FragmentProgram,
    mode: RenderMode,
) -> Result<WrappedFragment, RenderError> {
    let origin = match mode {
        RenderMode::SinglePass => FragCoordOrigin::BottomLeft,
        RenderMode::Simulation => FragCoordOrigin::TopLeft,
    };
    let wrapped = wrap_fragment(&program.source, origin);
    let reason = match (mode, wrapped.samples_state) {
        (RenderMode::Simulation, false) => {
            "runs as a simulation but declares no sampler2D for the previous state"
        }
        (RenderMode::SinglePass, true) => {
            "declares a sampler2D but runs as a single pass, which has no state texture"
        }
        _ => return Ok(wrapped),
    };
    Err(RenderError::ShaderInputs {
        label: program.label.clone(),
        reason: reason.to_string(),
    })
}

/// Produces a self-contained GLSL 450 fragment shader from desktop GLSL.
///
/// 1. Drop comments, the `#version` directive and the contract uniforms
///    (`viewPortSize`, `currentTime`, `deltaTime`, and every `sampler2D`).
///    Dropped lines stay as blank lines so compiler line numbers hold.
/// 2. Prepend a prelude declaring the uniform block and, when a sampler was
///    found, the state texture/sampler pair aliased to the user's names.
/// 3. Give the first `out vec4` an explicit location.
/// 4. For [`FragCoordOrigin::BottomLeft`], route `gl_FragCoord` through a
///    flipped copy set up by a generated `main`.
pub(crate) fn wrap_fragment(source: &str, origin: FragCoordOrigin) -> WrappedFragment {
    let mut body = String::new();
    let mut skipped_version = false;
    let mut located_output = false;
    let mut sampler_names: Vec<String> = Vec::new();

    for line in strip_comments(source).lines() {
        let trimmed = line.trim_start();
        if !skipped_version && trimmed.starts_with("#version") {
            skipped_version = true;
            body.push('\n');
            continue;
        }
        if let Some(declaration) = parse_uniform_declaration(trimmed) {
            if declaration.ty == "sampler2D" {
                sampler_names.extend(declaration.names.iter().map(|name| name.to_string()));
                body.push('\n');
                continue;
            }
            let kept: Vec<&str> = declaration
                .names
                .iter()
                .copied()
                .filter(|name| !is_contract_uniform(declaration.ty, name))
                .collect();
            if kept.len() != declaration.names.len() {
                if !kept.is_empty() {
                    let _ = write!(body, "uniform {} {};", declaration.ty, kept.join(", "));
                }
                body.push('\n');
                continue;
            }
        }
        if !located_output && is_unlocated_output(trimmed) {
            located_output = true;
            body.push_str("layout(location = 0) ");
            body.push_str(trimmed);
            body.push('\n');
            continue;
        }
        body.push_str(line);
        body.push('\n');
    }

    let mut wrapped = String::from(HEADER);
    if !sampler_names.is_empty() {
        wrapped.push_str(STATE_BINDINGS);
        for name in &sampler_names {
            let _ = writeln!(wrapped, "#define {name} fragtoy_state");
        }
    }
    if origin == FragCoordOrigin::BottomLeft {
        wrapped.push_str(FLIPPED_COORD_HEADER);
    }
    wrapped.push_str("#line 1\n");
    wrapped.push_str(&body);
    if origin == FragCoordOrigin::BottomLeft {
        wrapped.push_str(FLIPPED_COORD_FOOTER);
    }

    WrappedFragment {
        source: wrapped,
        samples_state: !sampler_names.is_empty(),
    }
}

fn is_contract_uniform(ty: &str, name: &str) -> bool {
    matches!(
        (ty, name),
        ("vec2", "viewPortSize") | ("float", "currentTime") | ("float", "deltaTime")
    )
}

fn is_unlocated_output(line: &str) -> bool {
    line.starts_with("out ") && line.contains("vec4")
}

pub(crate) fn vertex_shader_source() -> String {
    let corners: Vec<String> = FULLSCREEN_QUAD
        .iter()
        .map(|[x, y]| format!("        vec2({x:.1}, {y:.1})"))
        .collect();
    let count = FULLSCREEN_QUAD.len();
    let mut source = String::from("#version 450\n\nvoid main() {\n");
    let _ = writeln!(source, "    vec2 positions[{count}] = vec2[{count}](");
    let _ = writeln!(source, "{}\n    );", corners.join(",\n"));
    source.push_str("    gl_Position = vec4(positions[gl_VertexIndex], 0.0, 1.0);\n}\n");
    source
}

/// Uniform block shared by every program. Layout must match `ShaderParams`
/// in `gpu/uniforms.rs`.
const HEADER: &str = r"#version 450
layout(std140, set = 0, binding = 0) uniform FragtoyParams {
    vec2 _viewPortSize;
    float _currentTime;
    float _deltaTime;
} fragtoy_params;

#define viewPortSize fragtoy_params._viewPortSize
#define currentTime fragtoy_params._currentTime
#define deltaTime fragtoy_params._deltaTime
";

const STATE_BINDINGS: &str = r"layout(set = 1, binding = 0) uniform texture2D fragtoy_state_texture;
layout(set = 1, binding = 1) uniform sampler fragtoy_state_sampler;
#define fragtoy_state sampler2D(fragtoy_state_texture, fragtoy_state_sampler)
";

const FLIPPED_COORD_HEADER: &str = r"vec4 fragtoy_FragCoord;
#define gl_FragCoord fragtoy_FragCoord
#define main fragtoy_user_main
";

const FLIPPED_COORD_FOOTER: &str = r"
#undef main
#undef gl_FragCoord
void main() {
    fragtoy_FragCoord = vec4(gl_FragCoord.x, viewPortSize.y - gl_FragCoord.y, gl_FragCoord.z, gl_FragCoord.w);
    fragtoy_user_main();
}
";

//! Loads user fragment shaders from disk and works out what they need from
//! the renderer.
//!
//! A shader is a single GLSL file. Whether it reads the previous frame's
//! simulation state is declared in an optional sidecar manifest (see
//! [`manifest`]); without one the source is scanned for a `sampler2D`
//! uniform.

mod detect;
pub mod manifest;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use detect::{
    declares_state_sampler, parse_uniform_declaration, strip_comments, UniformDeclaration,
};
pub use manifest::{manifest_path_for, ManifestInputs, ShaderManifest};

#[derive(Debug, Error)]
pub enum ShaderSourceError {
    #[error("shader not found at {0}")]
    Missing(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse manifest {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("manifest {path} failed validation: {issues:?}")]
    ManifestValidation { path: PathBuf, issues: Vec<String> },

    #[error("shader source at {0} is empty")]
    Empty(PathBuf),
}

/// Where the state-texture decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityOrigin {
    Manifest,
    SourceScan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderCapabilities {
    /// The shader samples the previous simulation state and needs the
    /// ping-pong targets.
    pub state_texture: bool,
    pub origin: CapabilityOrigin,
}

#[derive(Debug, Clone)]
pub struct FragmentShader {
    pub path: PathBuf,
    pub source: String,
    pub capabilities: ShaderCapabilities,
    pub manifest: Option<ShaderManifest>,
}

impl FragmentShader {
    /// Manifest name if one was given, otherwise the file name.
    pub fn display_name(&self) -> String {
        self.manifest
            .as_ref()
            .and_then(|manifest| manifest.name.clone())
            .or_else(|| {
                self.path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

pub fn load_fragment_shader(path: impl AsRef<Path>) -> Result<FragmentShader, ShaderSourceError> {
    let path = path.as_ref().to_path_buf();
    if !path.is_file() {
        return Err(ShaderSourceError::Missing(path));
    }

    let source = fs::read_to_string(&path).map_err(|source| ShaderSourceError::Io {
        path: path.clone(),
        source,
    })?;
    if source.trim().is_empty() {
        return Err(ShaderSourceError::Empty(path));
    }

    let manifest = load_manifest(&manifest_path_for(&path))?;
    let capabilities = match manifest
        .as_ref()
        .and_then(|manifest| manifest.inputs.state_texture)
    {
        Some(state_texture) => ShaderCapabilities {
            state_texture,
            origin: CapabilityOrigin::Manifest,
        },
        None => {
            let state_texture = declares_state_sampler(&source);
            tracing::debug!(
                shader = %path.display(),
                state_texture,
                "inferred state texture use from shader source"
            );
            ShaderCapabilities {
                state_texture,
                origin: CapabilityOrigin::SourceScan,
            }
        }
    };

    Ok(FragmentShader {
        path,
        source,
        capabilities,
        manifest,
    })
}

fn load_manifest(path: &Path) -> Result<Option<ShaderManifest>, ShaderSourceError> {
    if !path.is_file() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|source| ShaderSourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let manifest: ShaderManifest =
        toml::from_str(&raw).map_err(|source| ShaderSourceError::ManifestParse {
            path: path.to_path_buf(),
            source,
        })?;
    let issues = manifest.validate();
    if !issues.is_empty() {
        return Err(ShaderSourceError::ManifestValidation {
            path: path.to_path_buf(),
            issues,
        });
    }
    Ok(Some(manifest))
}

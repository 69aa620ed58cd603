//! Optional sidecar metadata for a fragment shader.
//!
//! `roots.frag` is described by `roots.toml` next to it:
//!
//! ```toml
//! name = "Newton roots"
//! description = "Basins of attraction for z^3 - 1"
//!
//! [inputs]
//! state_texture = false
//! ```
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ShaderManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub inputs: ManifestInputs,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ManifestInputs {
    /// Whether the shader reads the previous simulation state. Left unset,
    /// the loader inspects the source instead.
    #[serde(default)]
    pub state_texture: Option<bool>,
}

impl ShaderManifest {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                issues.push("manifest name must not be empty".to_string());
            }
        }
        issues
    }
}

/// Location of the sidecar manifest for a shader file.
pub fn manifest_path_for(shader: &Path) -> PathBuf {
    shader.with_extension("toml")
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor configuration, stored as RON.

use crate::edge::EdgeType;
use crate::geometry::DEFAULT_CURVE_SEGMENTS;
use crate::history::MAX_HISTORY;
use crate::scene::DEFAULT_SCENE_SIZE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Editor session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of undo checkpoints
    pub history_capacity: usize,
    /// Canvas width for new scenes
    pub scene_width: f64,
    /// Canvas height for new scenes
    pub scene_height: f64,
    /// Edge style used for new connections
    pub default_edge_type: EdgeType,
    /// Replace the selection with pasted nodes
    pub select_pasted: bool,
    /// Number of segments a bezier edge is flattened into for cut tests
    pub cut_curve_segments: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: MAX_HISTORY,
            scene_width: DEFAULT_SCENE_SIZE,
            scene_height: DEFAULT_SCENE_SIZE,
            default_edge_type: EdgeType::Bezier,
            select_pasted: true,
            cut_curve_segments: DEFAULT_CURVE_SEGMENTS,
        }
    }
}

impl EditorConfig {
    /// Load configuration from a RON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = ron::from_str(&content)?;
        if config.history_capacity == 0 {
            return Err(ConfigError::Invalid("history_capacity must be at least 1".into()));
        }
        tracing::debug!("Loaded editor config from {:?}", path);
        Ok(config)
    }

    /// Save configuration to a RON file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let pretty = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        let content = ron::ser::to_string_pretty(self, pretty)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("Config file {path:?}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// File is not valid RON
    #[error("Config parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Configuration could not be encoded
    #[error("Config encode error: {0}")]
    Encode(#[from] ron::Error),

    /// Value out of range
    #[error("Invalid config: {0}")]
    Invalid(String),
}

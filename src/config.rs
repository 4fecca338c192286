use crate::render::RendererConfig;
use crate::scene::CameraSettings;
use crate::texture::LabelLayout;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "http://localhost:3000";
pub const DEFAULT_ASSET_PATH: &str = "assets/chip_bag.glb";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Studio settings. Every field has a default, so a partial JSON file only
/// overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StudioConfig {
    pub asset_path: PathBuf,
    pub api_base: String,
    pub label: LabelLayout,
    pub camera: CameraSettings,
    pub renderer: RendererConfig,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            asset_path: PathBuf::from(DEFAULT_ASSET_PATH),
            api_base: DEFAULT_API_BASE.to_string(),
            label: LabelLayout::default(),
            camera: CameraSettings::default(),
            renderer: RendererConfig::default(),
        }
    }
}

impl StudioConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&raw)?;
        log::info!("[config] loaded {}", path.display());
        Ok(config)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

//! Configuration system
//!
//! Device defaults and asset loading settings, loadable from TOML or RON.

pub use serde::{Serialize, Deserialize};

use crate::render::api::{SamplerFilter, SamplerWrapMode};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// # Device Configuration
///
/// Defaults applied when the device layer creates state on behalf of a model,
/// such as the sampler shared by every surface texture slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Filter used by the default sampler
    pub default_filter: SamplerFilter,
    /// Wrap mode for all three axes of the default sampler
    pub default_wrap: SamplerWrapMode,
    /// Requested anisotropy; clamped to what the device supports
    pub max_anisotropy: u32,
    /// Mip LOD bias of the default sampler
    pub mip_bias: i32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            default_filter: SamplerFilter::Anisotropic,
            default_wrap: SamplerWrapMode::Repeat,
            max_anisotropy: 16,
            mip_bias: 0,
        }
    }
}

/// # Asset Configuration
///
/// Controls how models and textures are located and decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directories searched for relative asset paths, in order
    pub search_paths: Vec<String>,
    /// Flip decoded images so row 0 is the bottom (GL texture convention)
    pub flip_textures_vertically: bool,
    /// Seed for the content hashes that key the resource caches
    pub hash_seed: u32,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            search_paths: vec!["assets".to_string(), ".".to_string()],
            flip_textures_vertically: true,
            hash_seed: 0,
        }
    }
}

impl AssetConfig {
    /// Resolve `path` against the search paths
    ///
    /// Returns the first candidate that exists, or `path` unchanged when none
    /// does (so the caller reports the original name as missing).
    pub fn resolve(&self, path: &str) -> std::path::PathBuf {
        let direct = std::path::PathBuf::from(path);
        if direct.is_absolute() || direct.exists() {
            return direct;
        }

        self.search_paths
            .iter()
            .map(|dir| std::path::Path::new(dir).join(path))
            .find(|candidate| candidate.exists())
            .unwrap_or(direct)
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderHalConfig {
    /// Device defaults
    pub device: DeviceConfig,
    /// Asset loading settings
    pub assets: AssetConfig,
}

impl Config for RenderHalConfig {}

//! Configuration loading and root folder resolution
//!
//! Every setting follows the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not an error; the portal starts on defaults.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const ENV_ROOT_FOLDER: &str = "DAISY_ROOT_FOLDER";
pub const ENV_CONFIG_FILE: &str = "DAISY_CONFIG";
pub const ENV_ROSTER_PATH: &str = "DAISY_ROSTER_PATH";
pub const ENV_DATABASE_PATH: &str = "DAISY_DATABASE_PATH";
pub const ENV_BIND_ADDRESS: &str = "DAISY_BIND_ADDRESS";
pub const ENV_MEDIA_CLOUD_NAME: &str = "DAISY_MEDIA_CLOUD_NAME";
pub const ENV_MEDIA_API_KEY: &str = "DAISY_MEDIA_API_KEY";
pub const ENV_MEDIA_API_SECRET: &str = "DAISY_MEDIA_API_SECRET";
pub const ENV_MEDIA_BASE_URL: &str = "DAISY_MEDIA_BASE_URL";

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5000";
pub const DEFAULT_MEDIA_BASE_URL: &str = "https://api.cloudinary.com";
const ROSTER_FILE_NAME: &str = "students.csv";
const DATABASE_FILE_NAME: &str = "portal.db";

/// Contents of `config.toml`; every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub roster_path: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub bind_address: Option<String>,
    #[serde(default)]
    pub media_host: MediaHostToml,
}

/// `[media_host]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaHostToml {
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub base_url: Option<String>,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub root_folder: Option<PathBuf>,
    pub roster_path: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub bind_address: Option<String>,
}

/// Media host credentials
#[derive(Clone, Default)]
pub struct MediaHostSettings {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub base_url: String,
}

impl MediaHostSettings {
    /// All credentials present
    pub fn is_configured(&self) -> bool {
        !self.cloud_name.trim().is_empty()
            && !self.api_key.trim().is_empty()
            && !self.api_secret.trim().is_empty()
    }
}

impl std::fmt::Debug for MediaHostSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaHostSettings")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Fully resolved portal configuration
#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub root_folder: PathBuf,
    pub roster_path: PathBuf,
    pub database_path: PathBuf,
    pub bind_address: String,
    pub media_host: MediaHostSettings,
}

impl PortalConfig {
    /// Resolve every setting from CLI overrides, environment, TOML and defaults
    pub fn resolve(overrides: &ConfigOverrides) -> Result<Self> {
        let config_path = overrides
            .config_file
            .clone()
            .or_else(|| env_path(ENV_CONFIG_FILE))
            .or_else(default_config_file);
        let toml_config = match config_path {
            Some(path) => load_toml_config(&path)?,
            None => TomlConfig::default(),
        };

        Ok(Self::from_sources(overrides, &toml_config))
    }

    /// Resolve against an already-loaded TOML config
    pub fn from_sources(overrides: &ConfigOverrides, toml_config: &TomlConfig) -> Self {
        let root_folder = overrides
            .root_folder
            .clone()
            .or_else(|| env_path(ENV_ROOT_FOLDER))
            .or_else(|| toml_config.root_folder.clone())
            .unwrap_or_else(default_root_folder);

        let roster_path = overrides
            .roster_path
            .clone()
            .or_else(|| env_path(ENV_ROSTER_PATH))
            .or_else(|| toml_config.roster_path.clone())
            .unwrap_or_else(|| root_folder.join(ROSTER_FILE_NAME));

        let database_path = overrides
            .database_path
            .clone()
            .or_else(|| env_path(ENV_DATABASE_PATH))
            .or_else(|| toml_config.database_path.clone())
            .unwrap_or_else(|| root_folder.join(DATABASE_FILE_NAME));

        let bind_address = overrides
            .bind_address
            .clone()
            .or_else(|| env_string(ENV_BIND_ADDRESS))
            .or_else(|| toml_config.bind_address.clone())
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let media = &toml_config.media_host;
        let media_host = MediaHostSettings {
            cloud_name: env_string(ENV_MEDIA_CLOUD_NAME)
                .or_else(|| media.cloud_name.clone())
                .unwrap_or_default(),
            api_key: env_string(ENV_MEDIA_API_KEY)
                .or_else(|| media.api_key.clone())
                .unwrap_or_default(),
            api_secret: env_string(ENV_MEDIA_API_SECRET)
                .or_else(|| media.api_secret.clone())
                .unwrap_or_default(),
            base_url: env_string(ENV_MEDIA_BASE_URL)
                .or_else(|| media.base_url.clone())
                .unwrap_or_else(|| DEFAULT_MEDIA_BASE_URL.to_string()),
        };

        Self {
            root_folder,
            roster_path,
            database_path,
            bind_address,
            media_host,
        }
    }

    /// Create the root folder if missing
    pub fn ensure_root_folder(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }
}

/// Read a TOML config file
///
/// Missing file → warning and defaults. Unparseable file → `Error::Config`.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!("Config file not found: {} (using defaults)", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str::<TomlConfig>(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
    info!("Loaded config file: {}", path.display());
    Ok(config)
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env_string(key).map(PathBuf::from)
}

/// `~/.config/daisy-portal/config.toml` (platform equivalent), if it exists
fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("daisy-portal").join("config.toml"))
        .filter(|p| p.exists())
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("daisy-portal"))
        .unwrap_or_else(|| PathBuf::from("./daisy_data"))
}

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR_PREFIX: &str = "drive-tabular";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub google: GoogleConfig,
    pub secrets: SecretsConfig,
    pub credentials: CredentialsConfig,
    pub staging: StagingConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// OAuth installed-application flow, approved once in a browser
    #[default]
    Installed,
    /// Pre-authorized service account key, no interactive step
    ServiceAccount,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct GoogleConfig {
    pub auth_mode: AuthMode,
    pub secret_key: Option<String>,
}

impl GoogleConfig {
    /// Name of the secret entry holding the JSON credential blob
    pub fn secret_key(&self) -> &str {
        match (&self.secret_key, self.auth_mode) {
            (Some(key), _) => key,
            (None, AuthMode::Installed) => "client_secrets_json",
            (None, AuthMode::ServiceAccount) => "service_account_json",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SecretsConfig {
    /// Secret sources, tried in order
    pub sources: Vec<String>,
    pub file: PathBuf,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            sources: vec!["env".to_string(), "file".to_string()],
            file: PathBuf::from(".streamlit/secrets.toml"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Write secrets and tokens to disk in plaintext
    pub persist: bool,
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct StagingConfig {
    pub keep_files: bool,
    pub dir: Option<PathBuf>,
}

impl Config {
    /// Load the config from the XDG config directory, falling back to defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read {:?}: {}", path, e)))?;
        let config: Config = toml::from_str(&contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {}", e)))?;

        if config.secrets.sources.is_empty() {
            return Err(AppError::Config(
                "At least one secret source must be set in config file".to_string(),
            ));
        }

        Ok(config)
    }

    fn xdg_dirs() -> xdg::BaseDirectories {
        xdg::BaseDirectories::with_prefix(CONFIG_DIR_PREFIX)
    }

    /// Get the config file path
    pub fn config_file() -> Result<PathBuf> {
        let xdg_dirs = Self::xdg_dirs();
        xdg_dirs
            .place_config_file("config.toml")
            .map_err(|e| AppError::Config(format!("Failed to create config directory: {}", e)))
    }

    /// Get the cache directory path
    pub fn cache_dir() -> Result<PathBuf> {
        let xdg = Self::xdg_dirs();
        xdg.get_cache_home()
            .ok_or_else(|| AppError::Config("Failed to determine cache directory".to_string()))
    }

    /// Directory persisted credentials are written to
    pub fn credentials_dir(&self) -> Result<PathBuf> {
        match &self.credentials.dir {
            Some(dir) => Ok(dir.clone()),
            None => Self::cache_dir(),
        }
    }
}

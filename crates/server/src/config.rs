use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};

/// File name of the config inside the data directory.
pub const CONFIG_FILE: &str = "moodchat.toml";

pub const DEFAULT_PORT: u16 = 3001;

/// Environment variable holding the inference API token. Never written to disk.
pub const API_KEY_ENV: &str = "HUGGING_FACE_API_KEY";

/// Set to `1` to include failure details in error responses.
pub const DEV_MODE_ENV: &str = "MOODCHAT_DEV";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Where sessions and custom moods are persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Sqlite,
    Json,
    Memory,
}

impl StorageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Json => "json",
            Self::Memory => "memory",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "json" => Ok(Self::Json),
            "memory" => Ok(Self::Memory),
            other => Err(format!(
                "unknown storage backend '{}', expected sqlite, json or memory",
                other
            )),
        }
    }
}

/// Server configuration stored as TOML in the data directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    /// Text-generation endpoint
    pub api_url: String,
    /// Directory the config was loaded from; never stored in the file
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Uploaded files land here and are served under `/uploads`
    pub uploads_dir: PathBuf,
    pub storage: StorageKind,
    /// Adds failure details to 500 responses
    pub dev_mode: bool,
    #[serde(skip)]
    pub api_key: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            api_url: inference::DEFAULT_API_URL.to_string(),
            data_dir: PathBuf::from(".moodchat"),
            uploads_dir: PathBuf::from("public/uploads"),
            storage: StorageKind::default(),
            dev_mode: false,
            api_key: String::new(),
        }
    }
}

impl ServerConfig {
    pub fn config_path(data_dir: &Path) -> PathBuf {
        data_dir.join(CONFIG_FILE)
    }

    /// Reads `moodchat.toml` from `data_dir`. A missing file yields defaults;
    /// a malformed one is an error. `data_dir` is always the argument.
    pub async fn load(data_dir: &Path) -> Result<Self, ConfigError> {
        let path = Self::config_path(data_dir);
        if !path.exists() {
            debug!(path = %path.display(), "Config file does not exist, using defaults");
            return Ok(Self {
                data_dir: data_dir.to_path_buf(),
                ..Self::default()
            });
        }

        let content = fs::read_to_string(&path).await?;
        let mut config: Self = toml::from_str(&content)?;
        config.data_dir = data_dir.to_path_buf();
        debug!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    pub async fn save(&self) -> Result<PathBuf, ConfigError> {
        fs::create_dir_all(&self.data_dir).await?;

        let path = Self::config_path(&self.data_dir);
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content).await?;

        debug!(path = %path.display(), "Config saved");
        Ok(path)
    }

    /// Applies `HUGGING_FACE_API_KEY` and `MOODCHAT_DEV` from the process environment.
    pub fn with_env(self) -> Self {
        self.with_env_from(|name| std::env::var(name).ok())
    }

    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup(API_KEY_ENV) {
            Some(key) if !key.trim().is_empty() => self.api_key = key.trim().to_string(),
            _ => warn!("{} is not set, inference requests will fail upstream", API_KEY_ENV),
        }
        if lookup(DEV_MODE_ENV).as_deref() == Some("1") {
            self.dev_mode = true;
        }
        self
    }

    /// Location of the SQLite database for the `sqlite` backend.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("moodchat.db")
    }

    /// Directory of the `json` backend.
    pub fn json_store_dir(&self) -> PathBuf {
        self.data_dir.join("store")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 3001);
        assert_eq!(config.storage, StorageKind::Sqlite);
        assert!(config.api_url.contains("Mixtral-8x7B-Instruct"));
        assert!(!config.dev_mode);
    }

    #[tokio::test]
    async fn test_load_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = ServerConfig::load(temp_dir.path()).await.unwrap();

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.data_dir, temp_dir.path());
    }

    #[tokio::test]
    async fn test_save_and_load_never_writes_api_key() {
        let temp_dir = TempDir::new().unwrap();
        let config = ServerConfig {
            port: 4000,
            data_dir: temp_dir.path().to_path_buf(),
            storage: StorageKind::Json,
            api_key: "hf_secret".to_string(),
            ..ServerConfig::default()
        };

        let path = config.save().await.unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("hf_secret"));
        assert!(raw.contains("storage = \"json\""));

        let loaded = ServerConfig::load(temp_dir.path()).await.unwrap();
        assert_eq!(loaded.port, 4000);
        assert_eq!(loaded.storage, StorageKind::Json);
        assert!(loaded.api_key.is_empty());
    }

    #[tokio::test]
    async fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(CONFIG_FILE), "dev_mode = true\n").unwrap();

        let config = ServerConfig::load(temp_dir.path()).await.unwrap();
        assert!(config.dev_mode);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.data_dir, temp_dir.path());
        assert_eq!(config.database_path(), temp_dir.path().join("moodchat.db"));
    }

    #[tokio::test]
    async fn test_data_dir_follows_load_location() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(CONFIG_FILE),
            "data_dir = \"/somewhere/else\"\nport = 4100\n",
        )
        .unwrap();

        let config = ServerConfig::load(temp_dir.path()).await.unwrap();
        assert_eq!(config.port, 4100);
        assert_eq!(config.data_dir, temp_dir.path());

        config.save().await.unwrap();
        let raw = std::fs::read_to_string(temp_dir.path().join(CONFIG_FILE)).unwrap();
        assert!(!raw.contains("data_dir"));
    }

    #[tokio::test]
    async fn test_malformed_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(CONFIG_FILE), "port = \"many\"").unwrap();

        let err = ServerConfig::load(temp_dir.path()).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> =
            HashMap::from([(API_KEY_ENV, " hf_token "), (DEV_MODE_ENV, "1")]);
        let config =
            ServerConfig::default().with_env_from(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.api_key, "hf_token");
        assert!(config.dev_mode);

        let config = ServerConfig::default().with_env_from(|_| None);
        assert!(config.api_key.is_empty());
        assert!(!config.dev_mode);
    }

    #[test]
    fn test_storage_kind_parse() {
        assert_eq!("SQLite".parse::<StorageKind>().unwrap(), StorageKind::Sqlite);
        assert_eq!("memory".parse::<StorageKind>().unwrap(), StorageKind::Memory);
        assert!("redis".parse::<StorageKind>().is_err());
    }
}

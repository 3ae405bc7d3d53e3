use std::{fs, path::Path, path::PathBuf};

use common::crypto::SigningKey;
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "medseal";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DB_FILE_NAME: &str = "db.sqlite";
pub const SIGNING_KEY_FILE_NAME: &str = "signing_key.pem";
pub const UPLOADS_DIR_NAME: &str = "uploads";
pub const OUTBOX_DIR_NAME: &str = "outbox";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Port for the API server
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// Largest accepted record upload, in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Sender address written into outgoing messages
    #[serde(default)]
    pub mail_from: Option<String>,
    /// Seal and deliver every upload to its patient straight away
    #[serde(default)]
    pub auto_send_on_upload: bool,
}

fn default_api_port() -> u16 {
    5000
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            max_upload_bytes: default_max_upload_bytes(),
            mail_from: None,
            auto_send_on_upload: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the medseal directory (~/.medseal)
    pub medseal_dir: PathBuf,
    /// Path to the SQLite database
    pub db_path: PathBuf,
    /// Path to the sender's Ed25519 signing key
    pub signing_key_path: PathBuf,
    /// Where uploaded record files are stored
    pub uploads_path: PathBuf,
    /// Where outgoing deliveries are written
    pub outbox_path: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the medseal directory path (custom or default ~/.medseal)
    pub fn medseal_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    fn paths(medseal_dir: PathBuf, config: AppConfig) -> Self {
        Self {
            db_path: medseal_dir.join(DB_FILE_NAME),
            signing_key_path: medseal_dir.join(SIGNING_KEY_FILE_NAME),
            uploads_path: medseal_dir.join(UPLOADS_DIR_NAME),
            outbox_path: medseal_dir.join(OUTBOX_DIR_NAME),
            config_path: medseal_dir.join(CONFIG_FILE_NAME),
            medseal_dir,
            config,
        }
    }

    /// Initialize a new medseal directory around an existing signing key
    ///
    /// Keys are never generated here. The key at `signing_key` must be an
    /// Ed25519 PKCS#8 PEM; it is checked before anything is written.
    pub fn init(
        custom_path: Option<PathBuf>,
        signing_key: &Path,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let medseal_dir = Self::medseal_dir(custom_path)?;

        if medseal_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        let pem = fs::read_to_string(signing_key)?;
        SigningKey::from_pem(&pem).map_err(|e| StateError::InvalidKey(e.to_string()))?;

        let state = Self::paths(medseal_dir, config.unwrap_or_default());

        fs::create_dir_all(&state.medseal_dir)?;
        fs::create_dir_all(&state.uploads_path)?;
        fs::create_dir_all(&state.outbox_path)?;
        fs::write(&state.signing_key_path, pem)?;

        let config_toml = toml::to_string_pretty(&state.config)?;
        fs::write(&state.config_path, config_toml)?;

        // Empty database, migrated by the service on first start
        fs::write(&state.db_path, "")?;

        Ok(state)
    }

    /// Load existing state from the medseal directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let medseal_dir = Self::medseal_dir(custom_path)?;

        if !medseal_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let config_path = medseal_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }
        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        let state = Self::paths(medseal_dir, config);

        if !state.db_path.exists() {
            return Err(StateError::MissingFile(DB_FILE_NAME.to_string()));
        }
        if !state.signing_key_path.exists() {
            return Err(StateError::MissingFile(SIGNING_KEY_FILE_NAME.to_string()));
        }
        if !state.uploads_path.exists() {
            return Err(StateError::MissingFile(format!("{}/", UPLOADS_DIR_NAME)));
        }
        if !state.outbox_path.exists() {
            return Err(StateError::MissingFile(format!("{}/", OUTBOX_DIR_NAME)));
        }

        Ok(state)
    }

    /// Load the sender's signing key
    pub fn load_signing_key(&self) -> Result<SigningKey, StateError> {
        let pem = fs::read_to_string(&self.signing_key_path)?;
        SigningKey::from_pem(&pem).map_err(|e| StateError::InvalidKey(e.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("medseal directory not initialized. Run 'medseal init' first")]
    NotInitialized,

    #[error("medseal directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

use std::path::PathBuf;

use common::crypto::SigningKey;

use crate::state::AppState;

/// Fully resolved runtime configuration for the daemon
///
/// Everything the service needs is passed in here; nothing is read from
/// the environment once the service starts.
#[derive(Debug)]
pub struct Config {
    // http server configuration
    /// Port for the API HTTP server
    pub api_port: u16,
    /// Largest accepted upload body, in bytes
    pub max_upload_bytes: usize,

    // data store configuration
    /// a path to a sqlite database, if not set then an
    ///  in-memory database will be used
    pub sqlite_path: Option<PathBuf>,
    /// Directory holding uploaded record files
    pub uploads_dir: PathBuf,
    /// Directory deliveries are written into
    pub outbox_dir: PathBuf,

    // sealing
    /// The sender identity every package is signed with
    pub signing_key: SigningKey,
    /// From address recorded on outgoing messages
    pub mail_from: Option<String>,
    /// Deliver each upload to its patient immediately
    pub auto_send_on_upload: bool,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Resolve a service configuration from an initialized app directory
    pub fn from_app_state(
        state: &AppState,
        signing_key: SigningKey,
        log_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            api_port: state.config.api_port,
            max_upload_bytes: state.config.max_upload_bytes,
            sqlite_path: Some(state.db_path.clone()),
            uploads_dir: state.uploads_path.clone(),
            outbox_dir: state.outbox_path.clone(),
            signing_key,
            mail_from: state.config.mail_from.clone(),
            auto_send_on_upload: state.config.auto_send_on_upload,
            log_level: tracing::Level::INFO,
            log_dir,
        }
    }
}

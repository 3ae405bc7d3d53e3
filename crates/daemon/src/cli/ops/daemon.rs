use clap::Args;

use medseal_daemon::state::AppState;
use medseal_daemon::{spawn_service, ServiceConfig};

#[derive(Args, Debug, Clone)]
pub struct Daemon {
    /// Override API server port (default from config)
    #[arg(long)]
    pub api_port: Option<u16>,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long)]
    pub log_dir: Option<std::path::PathBuf>,

    /// Default log level; RUST_LOG overrides it
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,
}

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("state error: {0}")]
    StateError(#[from] medseal_daemon::state::StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Daemon {
    type Error = DaemonError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = AppState::load(ctx.config_path.clone())?;
        let signing_key = state.load_signing_key()?;

        let mut config = ServiceConfig::from_app_state(&state, signing_key, self.log_dir.clone());
        if let Some(port) = self.api_port {
            config.api_port = port;
        }
        config.log_level = self.log_level;

        spawn_service(&config).await;
        Ok("daemon ended".to_string())
    }
}

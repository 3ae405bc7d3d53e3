use std::path::PathBuf;

use clap::Args;

use medseal_daemon::state::{AppConfig, AppState, StateError};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Existing Ed25519 private key (PKCS#8 PEM) every package is signed with
    #[arg(long)]
    pub signing_key: PathBuf,

    /// API server port
    #[arg(long)]
    pub api_port: Option<u16>,

    /// Largest accepted record upload, in bytes
    #[arg(long)]
    pub max_upload_bytes: Option<usize>,

    /// From address written into outgoing messages
    #[arg(long)]
    pub mail_from: Option<String>,

    /// Send every upload to its patient straight away
    #[arg(long)]
    pub auto_send_on_upload: bool,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = StateError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            api_port: self.api_port.unwrap_or(defaults.api_port),
            max_upload_bytes: self.max_upload_bytes.unwrap_or(defaults.max_upload_bytes),
            mail_from: self.mail_from.clone(),
            auto_send_on_upload: self.auto_send_on_upload,
        };

        let state = AppState::init(ctx.config_path.clone(), &self.signing_key, Some(config))?;
        let sender = state.load_signing_key()?.verifying_key();
        let sender_pem = sender
            .to_pem()
            .map_err(|e| StateError::InvalidKey(e.to_string()))?;

        Ok(format!(
            "Initialized medseal directory at {}\n  api_port: {}\n\nSender public key (publish this for recipients):\n{}",
            state.medseal_dir.display(),
            state.config.api_port,
            sender_pem.trim_end()
        ))
    }
}

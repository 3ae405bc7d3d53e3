use std::path::PathBuf;

use clap::Args;

use common::directory::{KeyType, Role};
use medseal_daemon::http_server::api::client::ApiError;
use medseal_daemon::http_server::api::v0::keys::PublishRequest;

#[derive(Args, Debug, Clone)]
pub struct Publish {
    /// Stable identifier of the key owner
    #[arg(long)]
    pub uid: String,

    #[arg(long)]
    pub email: String,

    /// PATIENT, DOCTOR or ADMIN
    #[arg(long)]
    pub role: Role,

    /// RSA or ED25519
    #[arg(long)]
    pub key_type: KeyType,

    /// Public key PEM file
    #[arg(long)]
    pub pem: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("could not read {0}: {1}")]
    Read(String, std::io::Error),
    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Publish {
    type Error = PublishError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let public_key_pem = tokio::fs::read_to_string(&self.pem)
            .await
            .map_err(|e| PublishError::Read(self.pem.display().to_string(), e))?;

        let record = ctx
            .client
            .call(PublishRequest {
                uid: self.uid.clone(),
                email: self.email.clone(),
                role: Some(self.role),
                key_type: Some(self.key_type),
                public_key_pem,
            })
            .await?;

        Ok(format!("published {}", super::key_line(&record)))
    }
}

use std::path::PathBuf;

use clap::Args;
use uuid::Uuid;

use medseal_daemon::http_server::api::client::ApiError;

/// Fetch a published key as PEM
#[derive(Args, Debug, Clone)]
pub struct Download {
    /// Key id
    pub id: Uuid,

    /// Write to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),
    #[error("could not write {0}: {1}")]
    Write(String, std::io::Error),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Download {
    type Error = DownloadError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let pem = ctx
            .client
            .get_bytes(&format!("/api/v0/keys/{}/pem", self.id))
            .await?;

        match &self.output {
            Some(path) => {
                tokio::fs::write(path, &pem)
                    .await
                    .map_err(|e| DownloadError::Write(path.display().to_string(), e))?;
                Ok(format!("wrote {}", path.display()))
            }
            None => Ok(String::from_utf8_lossy(&pem).trim_end().to_string()),
        }
    }
}

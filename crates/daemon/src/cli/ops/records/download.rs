use std::path::PathBuf;

use clap::Args;
use uuid::Uuid;

use medseal_daemon::http_server::api::client::ApiError;

/// Fetch the original uploaded file
#[derive(Args, Debug, Clone)]
pub struct Download {
    /// Record id
    pub id: Uuid,

    /// Where to write the file
    #[arg(long)]
    pub output: PathBuf,
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
        let bytes = ctx
            .client
            .get_bytes(&format!("/api/v0/records/{}/download", self.id))
            .await?;
        tokio::fs::write(&self.output, &bytes)
            .await
            .map_err(|e| DownloadError::Write(self.output.display().to_string(), e))?;

        Ok(format!("wrote {} bytes to {}", bytes.len(), self.output.display()))
    }
}

use medseal_daemon::http_server::api::client::ApiError;
use medseal_daemon::http_server::api::v0::records::UploadRequest;

#[async_trait::async_trait]
impl crate::cli::op::Op for UploadRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let response = ctx.client.call(self.clone()).await?;

        let mut output = format!("uploaded {}", super::record_line(&response.record));
        if let Some(auto_send) = response.auto_send {
            match (auto_send.sent, auto_send.delivery_id, auto_send.reason) {
                (true, Some(id), _) => output.push_str(&format!("\nauto-sent: delivery {}", id)),
                (_, _, reason) => output.push_str(&format!(
                    "\nauto-send skipped: {}",
                    reason.unwrap_or_default()
                )),
            }
        }
        Ok(output)
    }
}

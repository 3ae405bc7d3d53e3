use medseal_daemon::http_server::api::client::ApiError;
use medseal_daemon::http_server::api::v0::keys::ListRequest;

#[async_trait::async_trait]
impl crate::cli::op::Op for ListRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let response = ctx.client.call(self.clone()).await?;

        if response.keys.is_empty() {
            return Ok("No keys found".to_string());
        }
        Ok(response
            .keys
            .iter()
            .map(super::key_line)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

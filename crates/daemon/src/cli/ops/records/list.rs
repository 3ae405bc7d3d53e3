use medseal_daemon::http_server::api::client::ApiError;
use medseal_daemon::http_server::api::v0::records::ListRequest;

#[async_trait::async_trait]
impl crate::cli::op::Op for ListRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let response = ctx.client.call(self.clone()).await?;

        if response.records.is_empty() {
            return Ok("No records found".to_string());
        }
        Ok(response
            .records
            .iter()
            .map(super::record_line)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

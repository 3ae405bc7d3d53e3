use medseal_daemon::http_server::api::client::ApiError;
use medseal_daemon::http_server::api::v0::share::ShareRequest;

#[async_trait::async_trait]
impl crate::cli::op::Op for ShareRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let response = ctx.client.call(self.clone()).await?;
        Ok(format!(
            "record {} sealed for {} (delivery {})\nsignature: {}",
            response.record_id, self.recipient, response.delivery_id, response.signature_b64
        ))
    }
}

use medseal_daemon::http_server::api::client::ApiError;
use medseal_daemon::http_server::api::v0::records::GetRequest;

#[async_trait::async_trait]
impl crate::cli::op::Op for GetRequest {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let record = ctx.client.call(self.clone()).await?;

        let mut lines = vec![
            super::record_line(&record),
            format!("  patient:  {}", record.patient_uid),
            format!("  uploader: {}", record.uploader_email),
            format!("  mime:     {}", record.mime_type),
        ];
        if !record.note.is_empty() {
            lines.push(format!("  note:     {}", record.note));
        }
        if !record.signature_b64.is_empty() {
            lines.push(format!("  signature: {}", record.signature_b64));
        }
        Ok(lines.join("\n"))
    }
}

//! A transport that drops each delivery into its own outbox directory
//!
//! Layout of `outbox/<delivery-id>/`:
//!
//! - `<stem>.package.json`
//! - `<stem>.signature.b64.txt`
//! - `sender_ed25519_public.pem`
//! - `message.txt` with the headers and body
//!
//! A mail relay (or a person) picks the directories up from there.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use common::transport::{Delivery, DeliveryId, Transport, TransportError};

pub const MESSAGE_FILE_NAME: &str = "message.txt";
pub const DEFAULT_MAIL_FROM: &str = "MedSeal <no-reply@medseal.local>";

#[derive(Debug, Clone)]
pub struct OutboxTransport {
    root: PathBuf,
    from: String,
}

impl OutboxTransport {
    pub fn new(root: impl Into<PathBuf>, from: Option<String>) -> Self {
        Self {
            root: root.into(),
            from: from.unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory a given delivery was written to
    pub fn delivery_dir(&self, id: &DeliveryId) -> PathBuf {
        self.root.join(id.to_string())
    }

    fn message(&self, delivery: &Delivery) -> String {
        let attachments = delivery
            .attachments()
            .iter()
            .map(|(name, _, _)| name.clone())
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "From: {}\nTo: {}\nSubject: {}\nAttachments: {}\n\n{}\n",
            self.from, delivery.to, delivery.subject, attachments, delivery.body
        )
    }
}

fn reject_header_injection(field: &str, value: &str) -> Result<(), TransportError> {
    if value.contains(['\r', '\n']) {
        return Err(TransportError::InvalidDelivery(format!(
            "{} must be a single line",
            field
        )));
    }
    Ok(())
}

#[async_trait]
impl Transport for OutboxTransport {
    async fn deliver(&self, delivery: Delivery) -> Result<DeliveryId, TransportError> {
        if delivery.to.trim().is_empty() {
            return Err(TransportError::InvalidDelivery("missing recipient".into()));
        }
        reject_header_injection("recipient", &delivery.to)?;
        reject_header_injection("subject", &delivery.subject)?;
        if delivery.artifact_stem.is_empty()
            || delivery.artifact_stem.contains(['/', '\\'])
            || delivery.artifact_stem.starts_with('.')
        {
            return Err(TransportError::InvalidDelivery(format!(
                "bad artifact name: {:?}",
                delivery.artifact_stem
            )));
        }

        let id = DeliveryId::new();
        let dir = self.delivery_dir(&id);
        tokio::fs::create_dir_all(&dir).await?;

        for (name, _, bytes) in delivery.attachments() {
            tokio::fs::write(dir.join(name), bytes).await?;
        }
        tokio::fs::write(dir.join(MESSAGE_FILE_NAME), self.message(&delivery)).await?;

        tracing::info!(delivery_id = %id, to = %delivery.to, dir = %dir.display(), "delivery written to outbox");
        Ok(id)
    }
}

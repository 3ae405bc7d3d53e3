//! Delivery of sealed packages to recipients
//!
//! A [`Delivery`] bundles the three artifacts a recipient needs: the package
//! bytes exactly as signed, the detached signature, and the sender's
//! verifying key, so verification needs no separate lookup. How they travel
//! is up to the [`Transport`].

mod memory;

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use memory::MemoryTransport;

/// Attachment name for the sender's verifying key
pub const SENDER_KEY_FILE_NAME: &str = "sender_ed25519_public.pem";

/// Identifies a single accepted delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliveryId(Uuid);

impl DeliveryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for DeliveryId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for DeliveryId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// A sealed package on its way to a recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Recipient address
    pub to: String,
    pub subject: String,
    pub body: String,
    /// Canonical package bytes, as signed
    pub package_bytes: Vec<u8>,
    pub signature_b64: String,
    pub sender_public_key_pem: String,
    /// Prefix for the package and signature attachment names
    pub artifact_stem: String,
}

impl Delivery {
    pub fn package_file_name(&self) -> String {
        format!("{}.package.json", self.artifact_stem)
    }

    pub fn signature_file_name(&self) -> String {
        format!("{}.signature.b64.txt", self.artifact_stem)
    }

    /// The attachments in delivery order, as (file name, content type, bytes)
    pub fn attachments(&self) -> [(String, &'static str, &[u8]); 3] {
        [
            (
                self.package_file_name(),
                "application/json",
                self.package_bytes.as_slice(),
            ),
            (
                self.signature_file_name(),
                "text/plain",
                self.signature_b64.as_bytes(),
            ),
            (
                SENDER_KEY_FILE_NAME.to_string(),
                "application/x-pem-file",
                self.sender_public_key_pem.as_bytes(),
            ),
        ]
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid delivery: {0}")]
    InvalidDelivery(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("transport error: {0}")]
    Other(String),
}

#[async_trait]
pub trait Transport: Send + Sync + Debug + Clone + 'static {
    /// Hand a delivery off. Success means the transport accepted it, not
    /// that the recipient has read it.
    async fn deliver(&self, delivery: Delivery) -> Result<DeliveryId, TransportError>;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_delivery_id_displays_as_uuid() {
        let uuid = Uuid::new_v4();
        let id = DeliveryId::from(uuid);
        assert_eq!(id.to_string(), uuid.hyphenated().to_string());
        assert_eq!(id.uuid(), uuid);
    }
}

//! Seal a payload for a published recipient and hand it to a transport
//!
//! The [`Dispatcher`] owns its collaborators explicitly: a key directory to
//! resolve recipients, a transport to deliver through, and the sender's
//! signing key. Nothing is read from ambient state.

use std::error::Error as StdError;

use crate::crypto::{RecipientPublicKey, SigningKey};
use crate::directory::{KeyDirectory, KeyType};
use crate::package::{seal, DetachedSignature, PackageError};
use crate::transport::{Delivery, DeliveryId, Transport, TransportError};
use crate::validate::KeyMaterial;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// No RSA key is published for the identifier
    #[error("recipient RSA public key not found: {0}")]
    RecipientNotFound(String),
    #[error("key directory error: {0}")]
    Directory(Box<dyn StdError + Send + Sync>),
    #[error(transparent)]
    Package(#[from] PackageError),
    #[error("delivery failed: {0}")]
    Transport(#[from] TransportError),
}

/// Who a dispatch goes to and how the message reads
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    /// uid or email the recipient's RSA key is published under
    pub recipient: String,
    /// Address the delivery is sent to
    pub recipient_email: String,
    pub subject: String,
    pub body: String,
    pub artifact_stem: String,
}

#[derive(Debug, Clone)]
pub struct DispatchReceipt {
    pub delivery_id: DeliveryId,
    pub signature: DetachedSignature,
}

#[derive(Debug, Clone)]
pub struct Dispatcher<D: KeyDirectory, T: Transport> {
    directory: D,
    transport: T,
    signer: SigningKey,
}

impl<D: KeyDirectory, T: Transport> Dispatcher<D, T> {
    pub fn new(directory: D, transport: T, signer: SigningKey) -> Self {
        Self {
            directory,
            transport,
            signer,
        }
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Seal `plaintext` for the recipient named in `request` and deliver it
    ///
    /// # Errors
    ///
    /// - [`DispatchError::RecipientNotFound`] if no RSA key is published
    ///   for the identifier
    /// - [`DispatchError::Package`] if the stored key is unusable or sealing
    ///   fails
    /// - [`DispatchError::Transport`] if the transport refuses the delivery
    pub async fn dispatch(
        &self,
        plaintext: &[u8],
        request: DispatchRequest,
    ) -> Result<DispatchReceipt, DispatchError> {
        let record = self
            .directory
            .resolve_recipient(&request.recipient, KeyType::Rsa)
            .await
            .map_err(|e| DispatchError::Directory(e.to_string().into()))?
            .ok_or_else(|| DispatchError::RecipientNotFound(request.recipient.clone()))?;

        let material = KeyMaterial::parse(&record.public_key_pem).map_err(PackageError::from)?;
        let recipient_key =
            RecipientPublicKey::from_key_material(&material).map_err(PackageError::from)?;

        let sealed = seal(plaintext, &recipient_key, &self.signer)?;
        let sender_public_key_pem = self
            .signer
            .verifying_key()
            .to_pem()
            .map_err(PackageError::from)?;

        let delivery = Delivery {
            to: request.recipient_email,
            subject: request.subject,
            body: request.body,
            package_bytes: sealed.bytes,
            signature_b64: sealed.signature.to_base64(),
            sender_public_key_pem,
            artifact_stem: request.artifact_stem,
        };

        let delivery_id = self.transport.deliver(delivery).await?;
        tracing::info!(
            recipient_uid = %record.uid,
            key_id = %record.id,
            delivery_id = %delivery_id,
            "dispatched sealed package"
        );

        Ok(DispatchReceipt {
            delivery_id,
            signature: sealed.signature,
        })
    }
}

//! Sealing a stored record and sending it to a recipient
//!
//! Used by the share endpoint and, when enabled, right after an upload.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common::directory::{KeyDirectory, KeyType};
use common::dispatch::{DispatchError, DispatchReceipt, DispatchRequest};
use common::transport::DeliveryId;

use crate::database::Record;
use crate::uploads::UploadError;
use crate::ServiceState;

const MESSAGE_BODY: &str = "Hi,\n\n\
Attached: encrypted package + signature.\n\
Receiver must: verify signature using sender Ed25519 public key, \
decrypt AES key using RSA private key, decrypt file using AES-GCM.\n\n\
Sender Ed25519 public key (PEM) is attached.\n\n\
MedSeal";

#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    #[error("record not found")]
    RecordNotFound,
    #[error("uploaded file missing on server")]
    FileMissing,
    #[error("upload storage error: {0}")]
    Upload(UploadError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<UploadError> for ShareError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Missing => ShareError::FileMissing,
            other => ShareError::Upload(other),
        }
    }
}

pub fn subject_for(record: &Record) -> String {
    format!(
        "MedSeal: encrypted record ({}) for patient {}",
        record.record_type, record.patient_uid
    )
}

pub fn artifact_stem_for(record: &Record) -> String {
    format!("record_{}", record.id)
}

/// Seal the stored file of `record_id` for `recipient` and deliver it to
/// `recipient_email`, then mark the record as sent
///
/// Once the transport has accepted the delivery this succeeds, even if the
/// record could not be marked afterwards.
pub async fn share_record(
    state: &ServiceState,
    record_id: Uuid,
    recipient: &str,
    recipient_email: &str,
) -> Result<DispatchReceipt, ShareError> {
    let record = Record::get(record_id, state.database())
        .await?
        .ok_or(ShareError::RecordNotFound)?;

    // Plaintext only lives for the duration of the seal
    let plaintext = zeroize::Zeroizing::new(state.uploads().read(&record.stored_file_name).await?);

    let request = DispatchRequest {
        recipient: recipient.to_string(),
        recipient_email: recipient_email.to_string(),
        subject: subject_for(&record),
        body: MESSAGE_BODY.to_string(),
        artifact_stem: artifact_stem_for(&record),
    };
    let receipt = state.dispatcher().dispatch(&plaintext, request).await?;

    // The package is already out; from here on failures are only logged
    match Record::mark_encrypted(record_id, &receipt.signature.to_base64(), state.database()).await
    {
        Ok(true) => tracing::info!(
            record_id = %record_id,
            delivery_id = %receipt.delivery_id,
            "record shared"
        ),
        Ok(false) => tracing::warn!(
            record_id = %record_id,
            delivery_id = %receipt.delivery_id,
            "record shared but disappeared before it could be marked"
        ),
        Err(e) => tracing::error!(
            record_id = %record_id,
            delivery_id = %receipt.delivery_id,
            "record shared but marking it encrypted failed: {}",
            e
        ),
    }

    Ok(receipt)
}

/// What happened when an upload was sent on to its patient
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AutoSendOutcome {
    pub sent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_id: Option<DeliveryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AutoSendOutcome {
    fn skipped(reason: impl Into<String>) -> Self {
        Self {
            sent: false,
            delivery_id: None,
            reason: Some(reason.into()),
        }
    }
}

/// Send a fresh upload to the patient's own RSA key
///
/// Never fails the upload; problems are reported in the outcome.
pub async fn auto_send(state: &ServiceState, record: &Record) -> AutoSendOutcome {
    let patient_key = match state
        .database()
        .resolve_recipient(&record.patient_uid, KeyType::Rsa)
        .await
    {
        Ok(Some(key)) => key,
        Ok(None) => return AutoSendOutcome::skipped("patient RSA public key not found"),
        Err(e) => {
            tracing::error!(record_id = %record.id, "auto-send key lookup failed: {}", e);
            return AutoSendOutcome::skipped("key lookup failed");
        }
    };

    match share_record(state, *record.id, &patient_key.uid, &patient_key.email).await {
        Ok(receipt) => AutoSendOutcome {
            sent: true,
            delivery_id: Some(receipt.delivery_id),
            reason: None,
        },
        Err(e) => {
            tracing::warn!(record_id = %record.id, "auto-send failed: {}", e);
            AutoSendOutcome::skipped(public_reason(&e))
        }
    }
}

/// A failure reason that is safe to show to a client
pub fn public_reason(err: &ShareError) -> String {
    match err {
        ShareError::RecordNotFound => "Record not found".to_string(),
        ShareError::FileMissing => "Uploaded file missing on server".to_string(),
        ShareError::Dispatch(DispatchError::RecipientNotFound(_)) => {
            "Recipient RSA public key not found".to_string()
        }
        ShareError::Dispatch(DispatchError::Package(e)) => e.redact().to_string(),
        ShareError::Dispatch(DispatchError::Transport(_)) => "delivery failed".to_string(),
        _ => "internal error".to_string(),
    }
}

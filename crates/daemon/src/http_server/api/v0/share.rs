use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use common::dispatch::DispatchError;
use common::package::PublicError;
use common::transport::DeliveryId;

use super::error_response;
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::sharing::{self, public_reason, ShareError};
use crate::ServiceState;

/// Seal a stored record for a published recipient and deliver it
#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct ShareRequest {
    /// Record to send
    #[arg(long)]
    pub record_id: Uuid,

    /// uid or email the recipient's RSA key is published under
    #[arg(long)]
    #[serde(default)]
    pub recipient: String,

    /// Address to deliver to
    #[arg(long)]
    #[serde(default)]
    pub recipient_email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareResponse {
    pub record_id: Uuid,
    pub delivery_id: DeliveryId,
    pub signature_b64: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<ShareRequest>,
) -> Result<impl IntoResponse, ShareHandlerError> {
    let recipient = req.recipient.trim();
    let recipient_email = req.recipient_email.trim();
    if recipient.is_empty() || recipient_email.is_empty() {
        return Err(ShareHandlerError::MissingFields);
    }

    let receipt = sharing::share_record(&state, req.record_id, recipient, recipient_email).await?;

    Ok(Json(ShareResponse {
        record_id: req.record_id,
        delivery_id: receipt.delivery_id,
        signature_b64: receipt.signature.to_base64(),
    }))
}

#[derive(Debug, thiserror::Error)]
pub enum ShareHandlerError {
    #[error("record_id, recipient, recipient_email required")]
    MissingFields,
    #[error(transparent)]
    Share(#[from] ShareError),
}

impl IntoResponse for ShareHandlerError {
    fn into_response(self) -> Response {
        let err = match self {
            ShareHandlerError::MissingFields => {
                return error_response(http::StatusCode::BAD_REQUEST, self.to_string())
            }
            ShareHandlerError::Share(err) => err,
        };

        let status = match &err {
            ShareError::RecordNotFound
            | ShareError::FileMissing
            | ShareError::Dispatch(DispatchError::RecipientNotFound(_)) => {
                http::StatusCode::NOT_FOUND
            }
            ShareError::Dispatch(DispatchError::Package(e)) => match e.redact() {
                PublicError::Rejected(_) => http::StatusCode::BAD_REQUEST,
                PublicError::UnsupportedVersion => http::StatusCode::UNPROCESSABLE_ENTITY,
                PublicError::CouldNotOpen | PublicError::Internal => {
                    http::StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ShareError::Dispatch(DispatchError::Transport(_)) => http::StatusCode::BAD_GATEWAY,
            _ => http::StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("share failed: {}", err);
        } else {
            tracing::info!("share refused: {}", err);
        }
        error_response(status, public_reason(&err))
    }
}

impl ApiRequest for ShareRequest {
    type Response = ShareResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/share")?;
        Ok(client.post(full_url).json(&self))
    }
}

use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use common::directory::{DirectoryError, KeyDirectory, KeyRecord, KeyType, NewKeyRecord, Role};

use super::super::error_response;
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

/// Every field is checked by the handler so a partial body gets a 400
/// naming what is required, rather than a deserialization error
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublishRequest {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub key_type: Option<KeyType>,
    #[serde(default)]
    pub public_key_pem: String,
}

pub type PublishResponse = KeyRecord;

pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<PublishRequest>,
) -> Result<impl IntoResponse, PublishError> {
    let (Some(role), Some(key_type)) = (req.role, req.key_type) else {
        return Err(PublishError::MissingFields);
    };
    if req.uid.trim().is_empty() || req.email.trim().is_empty() {
        return Err(PublishError::MissingFields);
    }

    let record = state
        .database()
        .publish(NewKeyRecord {
            uid: req.uid,
            email: req.email,
            role,
            key_type,
            public_key_pem: req.public_key_pem,
        })
        .await?;

    Ok((http::StatusCode::CREATED, Json(record)))
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("uid, email, role, key_type are required")]
    MissingFields,
    #[error(transparent)]
    Directory(#[from] DirectoryError<sqlx::Error>),
}

impl IntoResponse for PublishError {
    fn into_response(self) -> Response {
        match self {
            PublishError::MissingFields => {
                error_response(http::StatusCode::BAD_REQUEST, self.to_string())
            }
            PublishError::Directory(DirectoryError::Validation(e)) => {
                tracing::info!("rejected public key: {}", e);
                error_response(http::StatusCode::BAD_REQUEST, e.to_string())
            }
            PublishError::Directory(DirectoryError::MissingField(field)) => error_response(
                http::StatusCode::BAD_REQUEST,
                format!("{} is required", field),
            ),
            PublishError::Directory(
                e @ (DirectoryError::Conflict { .. } | DirectoryError::UidTaken { .. }),
            ) => {
                error_response(http::StatusCode::CONFLICT, e.to_string())
            }
            PublishError::Directory(DirectoryError::Provider(e)) => {
                tracing::error!("publishing key failed: {}", e);
                error_response(http::StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        }
    }
}

impl ApiRequest for PublishRequest {
    type Response = PublishResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/keys")?;
        Ok(client.post(full_url).json(&self))
    }
}

use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use common::directory::{DirectoryError, KeyDirectory, KeyQuery, KeyRecord, KeyType};

use super::super::error_response;
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

#[derive(Debug, Clone, Default, Serialize, Deserialize, clap::Args)]
pub struct ListRequest {
    /// Only keys published under this uid
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    /// Only keys published under this email
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// RSA or ED25519
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_type: Option<KeyType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    /// Newest first
    pub keys: Vec<KeyRecord>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<ListRequest>,
) -> Result<impl IntoResponse, ListError> {
    let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
    if blank(&req.uid) && blank(&req.email) {
        return Err(ListError::MissingIdentifier);
    }

    let keys = state
        .database()
        .find(KeyQuery {
            uid: req.uid.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()),
            email: req.email.filter(|e| !e.trim().is_empty()),
            key_type: req.key_type,
        })
        .await?;

    Ok(Json(ListResponse { keys }))
}

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("uid or email is required")]
    MissingIdentifier,
    #[error("directory error: {0}")]
    Directory(#[from] DirectoryError<sqlx::Error>),
}

impl IntoResponse for ListError {
    fn into_response(self) -> Response {
        match self {
            ListError::MissingIdentifier => {
                error_response(http::StatusCode::BAD_REQUEST, self.to_string())
            }
            ListError::Directory(e) => {
                tracing::error!("listing keys failed: {}", e);
                error_response(http::StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        }
    }
}

impl ApiRequest for ListRequest {
    type Response = ListResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/keys/list")?;
        Ok(client.post(full_url).json(&self))
    }
}

use axum::extract::{Json, Path, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder};
use url::Url;
use uuid::Uuid;

use super::super::error_response;
use crate::database::Record;
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

#[derive(Debug, Clone, clap::Args)]
pub struct GetRequest {
    /// Record id
    pub id: Uuid,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, GetError> {
    let record = Record::get(id, state.database())
        .await?
        .ok_or(GetError::NotFound)?;
    Ok(Json(record))
}

#[derive(Debug, thiserror::Error)]
pub enum GetError {
    #[error("Not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for GetError {
    fn into_response(self) -> Response {
        match self {
            GetError::NotFound => error_response(http::StatusCode::NOT_FOUND, self.to_string()),
            GetError::Database(e) => {
                tracing::error!("fetching record failed: {}", e);
                error_response(http::StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        }
    }
}

impl ApiRequest for GetRequest {
    type Response = Record;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join(&format!("/api/v0/records/{}", self.id))?;
        Ok(client.get(full_url))
    }
}

use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use super::super::error_response;
use crate::database::Record;
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct ListRequest {
    /// Patient whose records to list
    #[arg(long)]
    #[serde(default)]
    pub patient_uid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    /// Newest first
    pub records: Vec<Record>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<ListRequest>,
) -> Result<impl IntoResponse, ListError> {
    let patient_uid = req.patient_uid.trim();
    if patient_uid.is_empty() {
        return Err(ListError::MissingPatient);
    }

    let records = Record::list_by_patient(patient_uid, state.database()).await?;
    Ok(Json(ListResponse { records }))
}

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("patient_uid is required")]
    MissingPatient,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for ListError {
    fn into_response(self) -> Response {
        match self {
            ListError::MissingPatient => {
                error_response(http::StatusCode::BAD_REQUEST, self.to_string())
            }
            ListError::Database(e) => {
                tracing::error!("listing records failed: {}", e);
                error_response(http::StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        }
    }
}

impl ApiRequest for ListRequest {
    type Response = ListResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/records/list")?;
        Ok(client.post(full_url).json(&self))
    }
}

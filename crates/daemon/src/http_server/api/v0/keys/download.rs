use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use common::directory::{DirectoryError, KeyDirectory};

use super::super::{attachment, error_response};
use crate::ServiceState;

pub const PEM_CONTENT_TYPE: &str = "application/x-pem-file";

/// Serve a published key as a PEM file named `<uid>_<KEYTYPE>_public.pem`
pub async fn handler(
    State(state): State<ServiceState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, DownloadError> {
    let record = state
        .database()
        .get(id)
        .await?
        .ok_or(DownloadError::NotFound)?;

    let file_name = format!("{}_{}_public.pem", record.uid, record.key_type);
    Ok((
        [
            (header::CONTENT_TYPE, PEM_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, attachment(&file_name)),
        ],
        record.public_key_pem,
    ))
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("Key not found")]
    NotFound,
    #[error("directory error: {0}")]
    Directory(#[from] DirectoryError<sqlx::Error>),
}

impl IntoResponse for DownloadError {
    fn into_response(self) -> Response {
        match self {
            DownloadError::NotFound => error_response(http::StatusCode::NOT_FOUND, self.to_string()),
            DownloadError::Directory(e) => {
                tracing::error!("fetching key failed: {}", e);
                error_response(http::StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        }
    }
}

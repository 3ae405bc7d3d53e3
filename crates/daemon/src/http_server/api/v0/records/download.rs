use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use super::super::{attachment, error_response};
use crate::database::Record;
use crate::uploads::UploadError;
use crate::ServiceState;

/// The stored file under its original name
pub async fn handler(
    State(state): State<ServiceState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, DownloadError> {
    let record = Record::get(id, state.database())
        .await?
        .ok_or(DownloadError::NotFound)?;
    let bytes = state.uploads().read(&record.stored_file_name).await?;

    Ok((
        [
            (header::CONTENT_TYPE, record.mime_type.clone()),
            (
                header::CONTENT_DISPOSITION,
                attachment(&record.original_file_name),
            ),
        ],
        bytes,
    ))
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("Not found")]
    NotFound,
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for DownloadError {
    fn into_response(self) -> Response {
        match self {
            DownloadError::NotFound => {
                error_response(http::StatusCode::NOT_FOUND, self.to_string())
            }
            DownloadError::Upload(UploadError::Missing) => {
                tracing::warn!("record file missing from uploads");
                error_response(http::StatusCode::NOT_FOUND, "Uploaded file missing on server")
            }
            e => {
                tracing::error!("record download failed: {}", e);
                error_response(http::StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        }
    }
}

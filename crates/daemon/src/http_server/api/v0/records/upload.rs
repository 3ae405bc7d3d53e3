use std::path::PathBuf;

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use common::directory::normalize_email;

use super::super::error_response;
use crate::database::{NewRecord, Record};
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::sharing::{self, AutoSendOutcome};
use crate::uploads::UploadError;
use crate::ServiceState;

/// Multipart upload of a single record file
#[derive(Debug, Clone, clap::Args)]
pub struct UploadRequest {
    /// Patient the record belongs to
    #[arg(long)]
    pub patient_uid: String,

    /// Who is uploading
    #[arg(long)]
    pub uploader_email: String,

    /// Free-form category, e.g. LAB or IMAGING
    #[arg(long)]
    pub record_type: String,

    #[arg(long, default_value = "")]
    pub note: String,

    /// File to upload
    #[arg(long)]
    pub file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub record: Record,
    /// Present only when auto-send is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_send: Option<AutoSendOutcome>,
}

#[derive(Default)]
struct UploadForm {
    patient_uid: String,
    uploader_email: String,
    record_type: String,
    note: String,
    file: Option<(String, Option<String>, Vec<u8>)>,
}

async fn read_form(multipart: &mut Multipart) -> Result<UploadForm, UploadRecordError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "patient_uid" => form.patient_uid = field.text().await?.trim().to_string(),
            "uploader_email" => form.uploader_email = normalize_email(&field.text().await?),
            "record_type" => form.record_type = field.text().await?.trim().to_string(),
            "note" => form.note = field.text().await?,
            "file" => {
                let name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(String::from);
                let bytes = field.bytes().await?;
                form.file = Some((name, content_type, bytes.to_vec()));
            }
            other => tracing::debug!(field = other, "ignoring unknown upload field"),
        }
    }

    Ok(form)
}

pub async fn handler(
    State(state): State<ServiceState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, UploadRecordError> {
    let form = read_form(&mut multipart).await?;

    let Some((original_file_name, content_type, bytes)) = form.file else {
        return Err(UploadRecordError::MissingFields);
    };
    if form.patient_uid.is_empty() || form.uploader_email.is_empty() || form.record_type.is_empty()
    {
        return Err(UploadRecordError::MissingFields);
    }
    if bytes.len() > state.max_upload_bytes() {
        return Err(UploadRecordError::TooLarge(state.max_upload_bytes()));
    }

    let mime_type = content_type.unwrap_or_else(|| {
        mime_guess::from_path(&original_file_name)
            .first_or_octet_stream()
            .to_string()
    });

    let stored_file_name = state.uploads().store(&original_file_name, &bytes).await?;
    let record = Record::create(
        NewRecord {
            patient_uid: form.patient_uid,
            uploader_email: form.uploader_email,
            record_type: form.record_type,
            note: form.note,
            original_file_name,
            stored_file_name,
            mime_type,
            size_bytes: bytes.len() as i64,
        },
        state.database(),
    )
    .await?;
    tracing::info!(record_id = %record.id, patient_uid = %record.patient_uid, size = bytes.len(), "record uploaded");

    let auto_send = if state.auto_send_on_upload() {
        Some(sharing::auto_send(&state, &record).await)
    } else {
        None
    };

    // Re-read so the response reflects an auto-send that marked the record
    let record = match auto_send {
        Some(AutoSendOutcome { sent: true, .. }) => Record::get(*record.id, state.database())
            .await?
            .unwrap_or(record),
        _ => record,
    };

    Ok((
        http::StatusCode::CREATED,
        Json(UploadResponse { record, auto_send }),
    ))
}

#[derive(Debug, thiserror::Error)]
pub enum UploadRecordError {
    #[error("patient_uid, uploader_email, record_type and file are required")]
    MissingFields,
    #[error("file exceeds the {0} byte upload limit")]
    TooLarge(usize),
    #[error("invalid multipart body: {0}")]
    Multipart(#[from] MultipartError),
    #[error("storing upload failed: {0}")]
    Store(#[from] UploadError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for UploadRecordError {
    fn into_response(self) -> Response {
        match self {
            UploadRecordError::MissingFields => {
                error_response(http::StatusCode::BAD_REQUEST, self.to_string())
            }
            UploadRecordError::TooLarge(_) => {
                error_response(http::StatusCode::PAYLOAD_TOO_LARGE, self.to_string())
            }
            UploadRecordError::Multipart(ref e) => error_response(e.status(), self.to_string()),
            UploadRecordError::Store(_) | UploadRecordError::Database(_) => {
                tracing::error!("record upload failed: {}", self);
                error_response(http::StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        }
    }
}

impl ApiRequest for UploadRequest {
    type Response = UploadResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("/api/v0/records")?;

        let bytes = std::fs::read(&self.file).map_err(|source| ApiError::ReadFile {
            path: self.file.display().to_string(),
            source,
        })?;
        let file_name = self
            .file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let mime = mime_guess::from_path(&self.file).first_or_octet_stream();
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime.as_ref())?;

        let form = Form::new()
            .text("patient_uid", self.patient_uid)
            .text("uploader_email", self.uploader_email)
            .text("record_type", self.record_type)
            .text("note", self.note)
            .part("file", part);

        Ok(client.post(full_url).multipart(form))
    }
}

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::database::types::{DBool, DUuid};
use crate::database::Database;

/// An uploaded medical record; the file itself lives under uploads/
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Record {
    pub id: DUuid,
    pub patient_uid: String,
    pub uploader_email: String,
    pub record_type: String,
    pub note: String,
    pub original_file_name: String,
    pub stored_file_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub is_encrypted: DBool,
    /// Detached signature of the last package sealed from this record
    pub signature_b64: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Fields supplied at upload time
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub patient_uid: String,
    pub uploader_email: String,
    pub record_type: String,
    pub note: String,
    pub original_file_name: String,
    pub stored_file_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
}

impl Record {
    pub async fn create(record: NewRecord, db: &Database) -> Result<Record, sqlx::Error> {
        let id = DUuid::new();

        sqlx::query(
            r#"
            INSERT INTO records (
                id, patient_uid, uploader_email, record_type, note,
                original_file_name, stored_file_name, mime_type, size_bytes,
                created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(id)
        .bind(&record.patient_uid)
        .bind(&record.uploader_email)
        .bind(&record.record_type)
        .bind(&record.note)
        .bind(&record.original_file_name)
        .bind(&record.stored_file_name)
        .bind(&record.mime_type)
        .bind(record.size_bytes)
        .bind(OffsetDateTime::now_utc())
        .execute(&**db)
        .await?;

        Self::get(*id, db).await?.ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn get(id: Uuid, db: &Database) -> Result<Option<Record>, sqlx::Error> {
        let id = DUuid::from(id);
        sqlx::query_as::<_, Record>(
            r#"
            SELECT
                id, patient_uid, uploader_email, record_type, note,
                original_file_name, stored_file_name, mime_type, size_bytes,
                is_encrypted, signature_b64, created_at
            FROM records
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&**db)
        .await
    }

    /// All records for a patient, newest first
    pub async fn list_by_patient(
        patient_uid: &str,
        db: &Database,
    ) -> Result<Vec<Record>, sqlx::Error> {
        sqlx::query_as::<_, Record>(
            r#"
            SELECT
                id, patient_uid, uploader_email, record_type, note,
                original_file_name, stored_file_name, mime_type, size_bytes,
                is_encrypted, signature_b64, created_at
            FROM records
            WHERE patient_uid = ?1
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(patient_uid)
        .fetch_all(&**db)
        .await
    }

    /// Record that a package was sealed from this record
    pub async fn mark_encrypted(
        id: Uuid,
        signature_b64: &str,
        db: &Database,
    ) -> Result<bool, sqlx::Error> {
        let id = DUuid::from(id);
        let result = sqlx::query(
            r#"
            UPDATE records
            SET is_encrypted = 1, signature_b64 = ?1
            WHERE id = ?2
            "#,
        )
        .bind(signature_b64)
        .bind(id)
        .execute(&**db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

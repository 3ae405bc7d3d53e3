use async_trait::async_trait;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use common::directory::{DirectoryError, KeyDirectory, KeyQuery, KeyRecord, NewKeyRecord};

use crate::database::types::DUuid;
use crate::database::Database;

#[derive(Debug, FromRow)]
struct PublicKeyRow {
    id: DUuid,
    uid: String,
    email: String,
    role: String,
    key_type: String,
    public_key_pem: String,
    created_at: OffsetDateTime,
}

impl TryFrom<PublicKeyRow> for KeyRecord {
    type Error = DirectoryError<sqlx::Error>;

    fn try_from(row: PublicKeyRow) -> Result<Self, Self::Error> {
        let decode = |e: String| DirectoryError::Provider(sqlx::Error::Decode(e.into()));
        Ok(KeyRecord {
            id: row.id.into(),
            uid: row.uid,
            email: row.email,
            role: row.role.parse().map_err(decode)?,
            key_type: row.key_type.parse().map_err(decode)?,
            public_key_pem: row.public_key_pem,
            created_at: row.created_at,
        })
    }
}

fn rows_to_records(rows: Vec<PublicKeyRow>) -> Result<Vec<KeyRecord>, DirectoryError<sqlx::Error>> {
    rows.into_iter().map(KeyRecord::try_from).collect()
}

#[async_trait]
impl KeyDirectory for Database {
    type Error = sqlx::Error;

    async fn publish(&self, key: NewKeyRecord) -> Result<KeyRecord, DirectoryError<Self::Error>> {
        let key = key.normalize()?;

        // Both unique constraints are enforced by the table; SQLite names
        // the violated columns in the message
        let row = sqlx::query_as::<_, PublicKeyRow>(
            r#"
            INSERT INTO public_keys (id, uid, email, role, key_type, public_key_pem, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING id, uid, email, role, key_type, public_key_pem, created_at
            "#,
        )
        .bind(DUuid::new())
        .bind(&key.uid)
        .bind(&key.email)
        .bind(key.role.as_str())
        .bind(key.key_type.as_str())
        .bind(&key.public_key_pem)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(&**self)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                if db.message().contains("public_keys.uid") {
                    DirectoryError::UidTaken {
                        uid: key.uid.clone(),
                    }
                } else {
                    DirectoryError::Conflict {
                        email: key.email.clone(),
                        key_type: key.key_type,
                    }
                }
            }
            e => DirectoryError::Provider(e),
        })?;

        tracing::info!(uid = %row.uid, key_type = %row.key_type, "published public key");
        row.try_into()
    }

    async fn find(&self, query: KeyQuery) -> Result<Vec<KeyRecord>, DirectoryError<Self::Error>> {
        let email = query.email.as_deref().map(common::directory::normalize_email);
        let rows = sqlx::query_as::<_, PublicKeyRow>(
            r#"
            SELECT id, uid, email, role, key_type, public_key_pem, created_at
            FROM public_keys
            WHERE (?1 IS NULL OR uid = ?1)
              AND (?2 IS NULL OR email = ?2)
              AND (?3 IS NULL OR key_type = ?3)
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(query.uid.as_deref())
        .bind(email)
        .bind(query.key_type.map(|kt| kt.as_str()))
        .fetch_all(&**self)
        .await
        .map_err(DirectoryError::Provider)?;

        rows_to_records(rows)
    }

    async fn get(&self, id: Uuid) -> Result<Option<KeyRecord>, DirectoryError<Self::Error>> {
        let row = sqlx::query_as::<_, PublicKeyRow>(
            r#"
            SELECT id, uid, email, role, key_type, public_key_pem, created_at
            FROM public_keys
            WHERE id = ?1
            "#,
        )
        .bind(DUuid::from(id))
        .fetch_optional(&**self)
        .await
        .map_err(DirectoryError::Provider)?;

        row.map(KeyRecord::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::directory::{KeyType, Role};
    use common::testkit;

    async fn database() -> Database {
        let url = url::Url::parse("sqlite::memory:").unwrap();
        Database::connect(&url).await.unwrap()
    }

    fn rsa(uid: &str, email: &str) -> NewKeyRecord {
        NewKeyRecord {
            uid: uid.into(),
            email: email.into(),
            role: Role::Patient,
            key_type: KeyType::Rsa,
            public_key_pem: testkit::ALICE_RSA_PUBLIC.into(),
        }
    }

    #[tokio::test]
    async fn test_publish_get_resolve() {
        let db = database().await;
        let record = db.publish(rsa(" p-001 ", "Alice@Example.com")).await.unwrap();
        assert_eq!(record.uid, "p-001");
        assert_eq!(record.email, "alice@example.com");

        assert_eq!(db.get(record.id).await.unwrap(), Some(record.clone()));
        assert_eq!(
            db.resolve_recipient("ALICE@example.com", KeyType::Rsa)
                .await
                .unwrap()
                .map(|r| r.id),
            Some(record.id)
        );
        assert!(db
            .resolve_recipient("p-404", KeyType::Rsa)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_existing_uid_is_never_replaced() {
        let db = database().await;
        let original = db.publish(rsa("p-0042", "alice@example.com")).await.unwrap();

        let mut takeover = rsa("p-0042", "mallory@evil.example");
        takeover.public_key_pem = testkit::BOB_RSA_PUBLIC.into();
        let result = db.publish(takeover).await;
        assert!(matches!(result, Err(DirectoryError::UidTaken { ref uid }) if uid == "p-0042"));

        let resolved = db.resolve_recipient("p-0042", KeyType::Rsa).await.unwrap();
        assert_eq!(resolved, Some(original));
        assert_eq!(db.find(KeyQuery::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_conflicting_email_key_type() {
        let db = database().await;
        db.publish(rsa("p-001", "alice@example.com")).await.unwrap();

        let result = db.publish(rsa("p-002", "alice@example.com")).await;
        assert!(matches!(result, Err(DirectoryError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_invalid_pem_rejected_before_storage() {
        let db = database().await;
        let mut key = rsa("p-001", "alice@example.com");
        key.public_key_pem = "-----BEGIN CERTIFICATE-----".into();

        assert!(matches!(
            db.publish(key).await,
            Err(DirectoryError::Validation(_))
        ));
        assert!(db.find(KeyQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_filters_and_orders() {
        let db = database().await;
        db.publish(rsa("p-001", "a@example.com")).await.unwrap();
        db.publish(rsa("p-002", "b@example.com")).await.unwrap();

        let mut ed = rsa("dr-1", "a@example.com");
        ed.role = Role::Doctor;
        ed.key_type = KeyType::Ed25519;
        ed.public_key_pem = testkit::CLINIC_ED25519_PUBLIC.into();
        db.publish(ed).await.unwrap();

        let by_email = db
            .find(KeyQuery {
                email: Some("A@example.com".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        let uids: Vec<_> = by_email.iter().map(|r| r.uid.as_str()).collect();
        assert_eq!(uids, vec!["dr-1", "p-001"]);

        let rsa_only = db
            .find(KeyQuery {
                key_type: Some(KeyType::Rsa),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(rsa_only.len(), 2);
        assert_eq!(rsa_only[0].uid, "p-002");
    }
}

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{DirectoryError, KeyDirectory, KeyQuery, KeyRecord, NewKeyRecord};

/// In-memory key directory
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyDirectory {
    inner: Arc<RwLock<MemoryKeyDirectoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryKeyDirectoryInner {
    /// Records paired with their insertion sequence, which breaks ties
    /// between records created within the same instant
    records: Vec<(u64, KeyRecord)>,
    next_seq: u64,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryKeyDirectoryError {
    #[error("memory directory error: {0}")]
    Internal(String),
}

fn poisoned<E: std::fmt::Display>(e: E) -> DirectoryError<MemoryKeyDirectoryError> {
    DirectoryError::Provider(MemoryKeyDirectoryError::Internal(format!(
        "lock poisoned: {}",
        e
    )))
}

impl MemoryKeyDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyDirectory for MemoryKeyDirectory {
    type Error = MemoryKeyDirectoryError;

    async fn publish(&self, key: NewKeyRecord) -> Result<KeyRecord, DirectoryError<Self::Error>> {
        let key = key.normalize()?;
        let mut inner = self.inner.write().map_err(poisoned)?;

        if inner.records.iter().any(|(_, r)| r.uid == key.uid) {
            return Err(DirectoryError::UidTaken { uid: key.uid });
        }
        let conflict = inner
            .records
            .iter()
            .any(|(_, r)| r.email == key.email && r.key_type == key.key_type);
        if conflict {
            return Err(DirectoryError::Conflict {
                email: key.email,
                key_type: key.key_type,
            });
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;

        let record = KeyRecord {
            id: Uuid::new_v4(),
            uid: key.uid,
            email: key.email,
            role: key.role,
            key_type: key.key_type,
            public_key_pem: key.public_key_pem,
            created_at: OffsetDateTime::now_utc(),
        };
        inner.records.push((seq, record.clone()));

        Ok(record)
    }

    async fn find(&self, query: KeyQuery) -> Result<Vec<KeyRecord>, DirectoryError<Self::Error>> {
        let inner = self.inner.read().map_err(poisoned)?;

        let mut matches: Vec<&(u64, KeyRecord)> = inner
            .records
            .iter()
            .filter(|(_, r)| query.matches(r))
            .collect();
        matches.sort_by(|(a_seq, a), (b_seq, b)| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b_seq.cmp(a_seq))
        });

        Ok(matches.into_iter().map(|(_, r)| r.clone()).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<KeyRecord>, DirectoryError<Self::Error>> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner
            .records
            .iter()
            .find(|(_, r)| r.id == id)
            .map(|(_, r)| r.clone()))
    }
}

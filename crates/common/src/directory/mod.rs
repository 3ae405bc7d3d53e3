//! Lookup of published public keys
//!
//! Patients, doctors and administrators publish their public keys under a
//! stable uid and an email address. A sender looks a recipient up by either
//! one before sealing. Trust is implicit: whatever key is on file for an
//! identifier is the key that will be used.

mod memory;

use std::fmt::{self, Debug, Display};
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::validate::{KeyMaterial, ValidationError};

pub use memory::{MemoryKeyDirectory, MemoryKeyDirectoryError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Patient,
    Doctor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "PATIENT",
            Role::Doctor => "DOCTOR",
            Role::Admin => "ADMIN",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PATIENT" => Ok(Role::Patient),
            "DOCTOR" => Ok(Role::Doctor),
            "ADMIN" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Which protocol slot a published key fills
///
/// `Rsa` keys receive packages; `Ed25519` keys verify a sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    #[serde(rename = "RSA")]
    Rsa,
    #[serde(rename = "ED25519")]
    Ed25519,
}

impl KeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Rsa => "RSA",
            KeyType::Ed25519 => "ED25519",
        }
    }
}

impl Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RSA" => Ok(KeyType::Rsa),
            "ED25519" => Ok(KeyType::Ed25519),
            other => Err(format!("unknown key type: {}", other)),
        }
    }
}

/// A published public key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    pub id: Uuid,
    pub uid: String,
    pub email: String,
    pub role: Role,
    pub key_type: KeyType,
    pub public_key_pem: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A key about to be published
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewKeyRecord {
    pub uid: String,
    pub email: String,
    pub role: Role,
    pub key_type: KeyType,
    pub public_key_pem: String,
}

impl NewKeyRecord {
    /// Validate the PEM and normalize identifiers the way the directory
    /// stores them
    ///
    /// The uid and PEM are trimmed, the email trimmed and lowercased.
    pub fn normalize<E>(self) -> Result<Self, DirectoryError<E>> {
        let uid = self.uid.trim().to_string();
        if uid.is_empty() {
            return Err(DirectoryError::MissingField("uid"));
        }
        let email = normalize_email(&self.email);
        if email.is_empty() {
            return Err(DirectoryError::MissingField("email"));
        }

        let material = KeyMaterial::parse(&self.public_key_pem)?;

        Ok(Self {
            uid,
            email,
            role: self.role,
            key_type: self.key_type,
            public_key_pem: material.into_string(),
        })
    }
}

/// Filter for [`KeyDirectory::find`]; unset fields match anything
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyQuery {
    pub uid: Option<String>,
    pub email: Option<String>,
    pub key_type: Option<KeyType>,
}

impl KeyQuery {
    pub fn matches(&self, record: &KeyRecord) -> bool {
        self.uid.as_deref().map_or(true, |uid| record.uid == uid)
            && self
                .email
                .as_deref()
                .map_or(true, |email| record.email == normalize_email(email))
            && self.key_type.map_or(true, |kt| record.key_type == kt)
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// How a recipient identifier should be looked up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Email(String),
    Uid(String),
}

impl Identifier {
    /// Anything containing `@` is an email, everything else a uid
    pub fn parse(identifier: &str) -> Self {
        if identifier.contains('@') {
            Identifier::Email(normalize_email(identifier))
        } else {
            Identifier::Uid(identifier.trim().to_string())
        }
    }

    pub fn into_query(self, key_type: KeyType) -> KeyQuery {
        match self {
            Identifier::Email(email) => KeyQuery {
                email: Some(email),
                key_type: Some(key_type),
                ..Default::default()
            },
            Identifier::Uid(uid) => KeyQuery {
                uid: Some(uid),
                key_type: Some(key_type),
                ..Default::default()
            },
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError<T> {
    #[error("unhandled key directory error: {0}")]
    Provider(T),
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    /// Another uid already owns this (email, key type) pair
    #[error("a {key_type} key for {email} is already published by another uid")]
    Conflict { email: String, key_type: KeyType },
    /// A key is already published under this uid; keys are never replaced
    #[error("a key is already published under uid {uid}")]
    UidTaken { uid: String },
}

#[async_trait]
pub trait KeyDirectory: Send + Sync + Debug + Clone + 'static {
    type Error: Display + Debug + Send + Sync + 'static;

    /// Publish a key under a uid that has none yet
    ///
    /// Implementations must run [`NewKeyRecord::normalize`] first, so an
    /// invalid PEM never reaches storage.
    ///
    /// Should fail with the following errors to be considered correct:
    /// * `Err(DirectoryError::Validation)` - the PEM failed the envelope checks
    /// * `Err(DirectoryError::UidTaken)` - the uid already has a key
    /// * `Err(DirectoryError::Conflict)` - a different uid holds the same
    ///   (email, key type) pair
    async fn publish(&self, key: NewKeyRecord) -> Result<KeyRecord, DirectoryError<Self::Error>>;

    /// All records matching `query`, newest first
    async fn find(&self, query: KeyQuery) -> Result<Vec<KeyRecord>, DirectoryError<Self::Error>>;

    /// A record by id, `Ok(None)` if absent
    async fn get(&self, id: Uuid) -> Result<Option<KeyRecord>, DirectoryError<Self::Error>>;

    /// Resolve a recipient by uid or email to their newest key of `key_type`
    ///
    /// Absence is `Ok(None)`, never an error.
    async fn resolve_recipient(
        &self,
        identifier: &str,
        key_type: KeyType,
    ) -> Result<Option<KeyRecord>, DirectoryError<Self::Error>> {
        let query = Identifier::parse(identifier).into_query(key_type);
        Ok(self.find(query).await?.into_iter().next())
    }
}

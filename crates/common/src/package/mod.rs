//! The sealed package wire format
//!
//! A [`SealedPackage`] carries everything a recipient needs to recover a
//! payload except their private key: the AES-256-GCM nonce, tag and
//! ciphertext, plus the content secret wrapped under their RSA key. The
//! sender signs the package's canonical bytes with Ed25519 and ships the
//! [`DetachedSignature`] alongside it.
//!
//! # Canonical form
//!
//! Compact JSON, fields in declaration order, every binary field standard
//! base64 with padding:
//!
//! ```text
//! {"v":1,"alg":{"file":"AES-256-GCM","keywrap":"RSA-OAEP-SHA256","sig":"Ed25519"},"iv_b64":"…","tag_b64":"…","enc_key_b64":"…","data_b64":"…"}
//! ```
//!
//! The signature covers these exact bytes, so the field order and the
//! encoding of each field must never change within a version.

mod error;
mod open;
mod seal;
mod signature;

use serde::{Deserialize, Serialize};
use serde_with::base64::Base64;
use serde_with::serde_as;

use crate::crypto::{Ciphertext, WrappedKey};

pub use error::{CryptoStage, PackageError, PublicError};
pub use open::{open, open_bytes};
pub use seal::{seal, Sealed};
pub use signature::DetachedSignature;

/// The only package version this implementation reads or writes
pub const PACKAGE_VERSION: u32 = 1;
/// Content cipher for version 1
pub const FILE_ALGORITHM: &str = "AES-256-GCM";
/// Key wrap scheme for version 1
pub const KEYWRAP_ALGORITHM: &str = "RSA-OAEP-SHA256";
/// Signature scheme for version 1
pub const SIGNATURE_ALGORITHM: &str = "Ed25519";

/// The algorithm triple named inside every package
///
/// Not negotiated: a version implies exactly one triple, and a package whose
/// triple does not match its version is refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Algorithms {
    pub file: String,
    pub keywrap: String,
    pub sig: String,
}

impl Algorithms {
    pub fn v1() -> Self {
        Self {
            file: FILE_ALGORITHM.to_string(),
            keywrap: KEYWRAP_ALGORITHM.to_string(),
            sig: SIGNATURE_ALGORITHM.to_string(),
        }
    }
}

/// A sealed payload addressed to one recipient
///
/// Immutable once sealed. Field declaration order is the canonical
/// serialization order.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedPackage {
    #[serde(rename = "v")]
    pub version: u32,
    #[serde(rename = "alg")]
    pub algorithms: Algorithms,
    #[serde(rename = "iv_b64")]
    #[serde_as(as = "Base64")]
    pub nonce: Vec<u8>,
    #[serde(rename = "tag_b64")]
    #[serde_as(as = "Base64")]
    pub tag: Vec<u8>,
    #[serde(rename = "enc_key_b64")]
    #[serde_as(as = "Base64")]
    pub wrapped_key: Vec<u8>,
    #[serde(rename = "data_b64")]
    #[serde_as(as = "Base64")]
    pub ciphertext: Vec<u8>,
}

/// Just enough of a package to decide whether we can read it
#[derive(Deserialize)]
struct Header {
    #[serde(default)]
    v: serde_json::Value,
    #[serde(default)]
    alg: serde_json::Value,
}

impl SealedPackage {
    pub(crate) fn v1(ciphertext: Ciphertext, wrapped_key: WrappedKey) -> Self {
        Self {
            version: PACKAGE_VERSION,
            algorithms: Algorithms::v1(),
            nonce: ciphertext.nonce.to_vec(),
            tag: ciphertext.tag.to_vec(),
            wrapped_key: wrapped_key.bytes().to_vec(),
            ciphertext: ciphertext.data,
        }
    }

    /// Serialize to the exact bytes the signature is computed over
    pub fn to_canonical_bytes(&self) -> Result<Vec<u8>, PackageError> {
        serde_json::to_vec(self).map_err(|e| PackageError::crypto(CryptoStage::Encoding, e))
    }

    /// Parse a package, refusing unknown versions before decoding the body
    ///
    /// # Errors
    ///
    /// - [`PackageError::UnsupportedVersion`] if `v` or `alg` is not the
    ///   version 1 set
    /// - [`PackageError::Malformed`] if the bytes are not a package
    pub fn from_slice(bytes: &[u8]) -> Result<Self, PackageError> {
        Self::probe(bytes)?;
        serde_json::from_slice(bytes).map_err(|e| PackageError::Malformed(e.to_string()))
    }

    /// Check the version header of raw package bytes without decoding the
    /// binary fields
    pub fn probe(bytes: &[u8]) -> Result<(), PackageError> {
        let header: Header =
            serde_json::from_slice(bytes).map_err(|e| PackageError::Malformed(e.to_string()))?;

        if header.v != serde_json::Value::from(PACKAGE_VERSION) {
            return Err(PackageError::UnsupportedVersion);
        }
        match serde_json::from_value::<Algorithms>(header.alg) {
            Ok(alg) if alg == Algorithms::v1() => Ok(()),
            _ => Err(PackageError::UnsupportedVersion),
        }
    }

    /// Check an already decoded package declares the version 1 set
    pub fn check_version(&self) -> Result<(), PackageError> {
        if self.version != PACKAGE_VERSION || self.algorithms != Algorithms::v1() {
            return Err(PackageError::UnsupportedVersion);
        }
        Ok(())
    }
}

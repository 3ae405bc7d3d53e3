//! Cheap textual gate for externally supplied public keys
//!
//! Runs before any cryptographic parser sees attacker-controlled bytes. It
//! only checks the envelope: non-empty, both `PUBLIC KEY` markers present,
//! and a hard size ceiling. Whether the body is a real key is decided later
//! by the parsers in [`crate::crypto`].

use std::fmt;

/// Opening marker of an SPKI public key PEM
pub const BEGIN_MARKER: &str = "-----BEGIN PUBLIC KEY-----";
/// Closing marker of an SPKI public key PEM
pub const END_MARKER: &str = "-----END PUBLIC KEY-----";
/// Largest accepted PEM, in bytes after trimming
pub const MAX_PEM_SIZE: usize = 20_000;

/// Why a candidate public key was turned away
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Empty PEM")]
    Empty,
    #[error("PEM must contain BEGIN/END PUBLIC KEY")]
    MissingMarkers,
    #[error("PEM too large ({size} bytes, limit {limit})", limit = MAX_PEM_SIZE)]
    TooLarge { size: usize },
}

/// Public key text that passed [`validate_public_key_pem`]
///
/// Holds the trimmed PEM. Passing the gate says nothing about the key's
/// structure; parse it with the matching key type before use.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial(String);

impl KeyMaterial {
    /// Validate and wrap a PEM string
    pub fn parse(pem: &str) -> Result<Self, ValidationError> {
        validate_public_key_pem(pem)?;
        Ok(Self(pem.trim().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for KeyMaterial {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("len", &self.0.len())
            .finish()
    }
}

/// Check that `pem` looks like a public key PEM
///
/// Checks run in order: empty after trimming, both envelope markers present,
/// size at most [`MAX_PEM_SIZE`].
pub fn validate_public_key_pem(pem: &str) -> Result<(), ValidationError> {
    let s = pem.trim();
    if s.is_empty() {
        return Err(ValidationError::Empty);
    }

    if !s.contains(BEGIN_MARKER) || !s.contains(END_MARKER) {
        return Err(ValidationError::MissingMarkers);
    }

    if s.len() > MAX_PEM_SIZE {
        return Err(ValidationError::TooLarge { size: s.len() });
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testkit;

    fn padded_pem(total: usize) -> String {
        let overhead = BEGIN_MARKER.len() + END_MARKER.len() + 2;
        format!(
            "{}\n{}\n{}",
            BEGIN_MARKER,
            "A".repeat(total - overhead),
            END_MARKER
        )
    }

    #[test]
    fn test_accepts_real_keys() {
        assert!(validate_public_key_pem(testkit::ALICE_RSA_PUBLIC).is_ok());
        assert!(validate_public_key_pem(testkit::CLINIC_ED25519_PUBLIC).is_ok());
    }

    #[test]
    fn test_empty() {
        assert_eq!(validate_public_key_pem(""), Err(ValidationError::Empty));
        assert_eq!(
            validate_public_key_pem("  \n\t "),
            Err(ValidationError::Empty)
        );
    }

    #[test]
    fn test_missing_markers() {
        let err = validate_public_key_pem("MIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKCAQEA").unwrap_err();
        assert_eq!(err, ValidationError::MissingMarkers);
        assert_eq!(err.to_string(), "PEM must contain BEGIN/END PUBLIC KEY");

        // One marker is not enough
        let half = format!("{}\nAAAA\n", BEGIN_MARKER);
        assert_eq!(
            validate_public_key_pem(&half),
            Err(ValidationError::MissingMarkers)
        );

        // A private key is not a public key
        assert_eq!(
            validate_public_key_pem(testkit::ALICE_RSA_PRIVATE),
            Err(ValidationError::MissingMarkers)
        );
    }

    #[test]
    fn test_size_ceiling() {
        let oversized = padded_pem(25 * 1024);
        assert!(matches!(
            validate_public_key_pem(&oversized),
            Err(ValidationError::TooLarge { .. })
        ));

        assert!(validate_public_key_pem(&padded_pem(MAX_PEM_SIZE)).is_ok());
        assert!(validate_public_key_pem(&padded_pem(MAX_PEM_SIZE + 1)).is_err());
    }

    #[test]
    fn test_surrounding_whitespace_not_counted() {
        let pem = format!("\n\n   {}   \n\n", padded_pem(MAX_PEM_SIZE));
        assert!(validate_public_key_pem(&pem).is_ok());
    }

    #[test]
    fn test_key_material_is_trimmed() {
        let raw = format!("\n{}\n", testkit::ALICE_RSA_PUBLIC);
        let material = KeyMaterial::parse(&raw).unwrap();
        assert_eq!(material.as_str(), testkit::ALICE_RSA_PUBLIC.trim());
    }
}

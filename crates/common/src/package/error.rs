use std::error::Error as StdError;
use std::fmt;

use crate::crypto::KeyError;
use crate::validate::ValidationError;

type BoxError = Box<dyn StdError + Send + Sync>;

/// The primitive step a seal operation was in when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoStage {
    KeyGeneration,
    SymmetricEncryption,
    KeyWrap,
    Signing,
    Encoding,
}

impl fmt::Display for CryptoStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            CryptoStage::KeyGeneration => "key generation",
            CryptoStage::SymmetricEncryption => "symmetric encryption",
            CryptoStage::KeyWrap => "key wrap",
            CryptoStage::Signing => "signing",
            CryptoStage::Encoding => "encoding",
        };
        f.write_str(stage)
    }
}

/// Everything that can go wrong sealing or opening a package
///
/// Fine-grained on purpose, for callers inside the process. Anything that
/// crosses a network boundary must go through [`PackageError::redact`].
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error("invalid key material: {0}")]
    Validation(#[from] ValidationError),
    #[error("invalid key: {0}")]
    InvalidKey(#[from] KeyError),
    #[error("unsupported package version or algorithm set")]
    UnsupportedVersion,
    #[error("signature verification failed")]
    VerificationFailed,
    #[error("decryption failed")]
    DecryptFailed,
    #[error("malformed package: {0}")]
    Malformed(String),
    #[error("{stage} failed: {source}")]
    Crypto {
        stage: CryptoStage,
        #[source]
        source: BoxError,
    },
}

impl PackageError {
    pub(crate) fn crypto(stage: CryptoStage, source: impl Into<BoxError>) -> Self {
        PackageError::Crypto {
            stage,
            source: source.into(),
        }
    }

    /// Narrow the error to what a remote caller may learn
    ///
    /// Signature, unwrap and decrypt failures all collapse into
    /// [`PublicError::CouldNotOpen`] so that no response reveals which gate
    /// a forged or corrupted package tripped.
    pub fn redact(&self) -> PublicError {
        match self {
            PackageError::Validation(e) => PublicError::Rejected(e.to_string()),
            PackageError::InvalidKey(e) => PublicError::Rejected(e.to_string()),
            PackageError::UnsupportedVersion => PublicError::UnsupportedVersion,
            PackageError::VerificationFailed
            | PackageError::DecryptFailed
            | PackageError::Malformed(_) => PublicError::CouldNotOpen,
            PackageError::Crypto { .. } => PublicError::Internal,
        }
    }
}

/// The externally visible form of a [`PackageError`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PublicError {
    #[error("{0}")]
    Rejected(String),
    #[error("unsupported package version")]
    UnsupportedVersion,
    #[error("could not open package")]
    CouldNotOpen,
    #[error("internal error")]
    Internal,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_redact_merges_open_failures() {
        let verify = PackageError::VerificationFailed.redact();
        let decrypt = PackageError::DecryptFailed.redact();
        let malformed = PackageError::Malformed("eof".into()).redact();

        assert_eq!(verify, PublicError::CouldNotOpen);
        assert_eq!(verify, decrypt);
        assert_eq!(verify, malformed);
        assert_eq!(verify.to_string(), decrypt.to_string());
    }

    #[test]
    fn test_redact_keeps_validation_reason() {
        let err = PackageError::from(ValidationError::MissingMarkers);
        assert_eq!(
            err.redact(),
            PublicError::Rejected("PEM must contain BEGIN/END PUBLIC KEY".into())
        );
    }

    #[test]
    fn test_redact_hides_crypto_detail() {
        let err = PackageError::crypto(CryptoStage::KeyWrap, "modulus too small");
        assert_eq!(err.to_string(), "key wrap failed: modulus too small");
        assert_eq!(err.redact(), PublicError::Internal);
    }
}

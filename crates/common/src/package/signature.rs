use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::PackageError;
use crate::crypto::Signature;

/// An Ed25519 signature over a package's canonical bytes
///
/// Shipped next to the package rather than inside it, as standard base64
/// text.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct DetachedSignature(Signature);

impl From<Signature> for DetachedSignature {
    fn from(signature: Signature) -> Self {
        Self(signature)
    }
}

impl fmt::Debug for DetachedSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DetachedSignature({})", self.to_base64())
    }
}

impl fmt::Display for DetachedSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

impl DetachedSignature {
    /// Parse a base64 signature, ignoring surrounding whitespace
    ///
    /// A signature that cannot even be decoded cannot verify anything, so
    /// it is reported as [`PackageError::VerificationFailed`].
    pub fn from_base64(encoded: &str) -> Result<Self, PackageError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|_| PackageError::VerificationFailed)?;
        Self::from_slice(&bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, PackageError> {
        let signature =
            Signature::from_slice(bytes).map_err(|_| PackageError::VerificationFailed)?;
        Ok(Self(signature))
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0.to_bytes())
    }

    pub fn to_bytes(&self) -> [u8; 64] {
        self.0.to_bytes()
    }

    pub(crate) fn inner(&self) -> &Signature {
        &self.0
    }
}

//! Key wrap using RSA-OAEP with SHA-256
//!
//! The one-time content secret is encrypted directly under the recipient's
//! RSA public key with OAEP padding (SHA-256 for both the label hash and
//! MGF1). PKCS#1 v1.5 encryption padding is not offered anywhere.
//!
//! # Protocol Overview
//!
//! To wrap a secret for a recipient:
//! 1. **Encrypt**: RSA-OAEP-SHA256 encrypt the 32 secret bytes under the recipient key
//! 2. **Package**: The ciphertext (modulus-sized, e.g. 256 bytes for RSA-2048) is the `WrappedKey`
//!
//! The recipient recovers it by:
//! 1. **Decrypt**: RSA-OAEP-SHA256 decrypt with their private key
//! 2. **Check**: The result must be exactly one secret long

use rand_core::OsRng;
use rsa::Oaep;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::keys::{RecipientPrivateKey, RecipientPublicKey};
use super::secret::{Secret, SECRET_SIZE};

/// Errors that can occur during key wrap or unwrap
#[derive(Debug, thiserror::Error)]
pub enum WrapError {
    #[error("RSA-OAEP wrap error: {0}")]
    Wrap(rsa::Error),
    /// Deliberately carries no detail: wrong key and corrupted input look the same
    #[error("RSA-OAEP unwrap error")]
    Unwrap,
}

/// A one-time secret encrypted for a single recipient
///
/// Only the holder of the private key matching the public key used in
/// [`WrappedKey::new`] can recover the secret.
///
/// # Examples
///
/// ```ignore
/// let secret = Secret::generate()?;
/// let wrapped = WrappedKey::new(&secret, &alice_public)?;
/// let recovered = wrapped.recover(&alice_private)?;
/// assert_eq!(secret.bytes(), recovered.bytes());
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct WrappedKey(Vec<u8>);

impl From<Vec<u8>> for WrappedKey {
    fn from(bytes: Vec<u8>) -> Self {
        WrappedKey(bytes)
    }
}

impl WrappedKey {
    /// Wrap a secret for a specific recipient
    ///
    /// # Errors
    ///
    /// Returns an error if the RSA encryption fails (RNG failure, or a
    /// modulus too small to hold the OAEP-padded secret).
    pub fn new(secret: &Secret, recipient: &RecipientPublicKey) -> Result<Self, WrapError> {
        let wrapped = recipient
            .inner()
            .encrypt(&mut OsRng, Oaep::new::<Sha256>(), secret.bytes())
            .map_err(WrapError::Wrap)?;
        Ok(Self(wrapped))
    }

    /// Recover the wrapped secret using the recipient's private key
    ///
    /// # Errors
    ///
    /// Returns [`WrapError::Unwrap`] if the wrapped key was made for a
    /// different recipient, was corrupted, or does not hold a secret of
    /// the expected size. The cases are not distinguished.
    pub fn recover(&self, recipient_secret: &RecipientPrivateKey) -> Result<Secret, WrapError> {
        let unwrapped = recipient_secret
            .inner()
            .decrypt(Oaep::new::<Sha256>(), &self.0)
            .map(Zeroizing::new)
            .map_err(|_| WrapError::Unwrap)?;

        if unwrapped.len() != SECRET_SIZE {
            return Err(WrapError::Unwrap);
        }

        Secret::from_slice(&unwrapped).map_err(|_| WrapError::Unwrap)
    }

    /// Get a reference to the raw wrapped bytes
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }
}

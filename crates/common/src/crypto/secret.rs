//! One-time content encryption using AES-256-GCM
//!
//! Every sealed package gets a fresh `Secret`. It encrypts exactly one
//! payload under one random nonce, is wrapped for the recipient, and is
//! wiped when dropped.

use std::fmt;

use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::Aes256Gcm;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of AES-256-GCM nonce in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;
/// Size of AES-256-GCM key in bytes (256 bits)
pub const SECRET_SIZE: usize = 32;
/// Size of AES-256-GCM authentication tag in bytes (128 bits)
pub const TAG_SIZE: usize = 16;

/// Errors that can occur during encryption/decryption
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("secure random source failed: {0}")]
    Random(getrandom::Error),
    #[error("invalid secret size, expected {expected}, got {0}", expected = SECRET_SIZE)]
    InvalidSize(usize),
    #[error("invalid nonce size, expected {expected}, got {0}", expected = NONCE_SIZE)]
    InvalidNonce(usize),
    #[error("invalid tag size, expected {expected}, got {0}", expected = TAG_SIZE)]
    InvalidTag(usize),
    #[error("encrypt error")]
    Encrypt,
    #[error("decrypt error")]
    Decrypt,
}

/// Output of a single AEAD encryption, tag kept detached from the ciphertext
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ciphertext {
    pub nonce: [u8; NONCE_SIZE],
    pub tag: [u8; TAG_SIZE],
    pub data: Vec<u8>,
}

/// A 256-bit symmetric key used to encrypt a single package payload
///
/// Never serialized, never logged. The bytes are zeroized on drop, so a
/// `Secret` going out of scope is the wipe.
///
/// # Examples
///
/// ```ignore
/// let secret = Secret::generate()?;
/// let sealed = secret.encrypt(b"sensitive data")?;
/// let recovered = secret.decrypt(&sealed.nonce, &sealed.tag, &sealed.data)?;
/// assert_eq!(b"sensitive data", &recovered[..]);
/// ```
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Secret([u8; SECRET_SIZE]);

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(..)")
    }
}

impl From<[u8; SECRET_SIZE]> for Secret {
    fn from(bytes: [u8; SECRET_SIZE]) -> Self {
        Secret(bytes)
    }
}

impl Secret {
    /// Generate a new random secret using a cryptographically secure RNG
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::Random`] if the operating system RNG fails.
    pub fn generate() -> Result<Self, SecretError> {
        let mut buff = [0; SECRET_SIZE];
        getrandom::getrandom(&mut buff).map_err(SecretError::Random)?;
        Ok(Self(buff))
    }

    /// Create a secret from a byte slice
    ///
    /// # Errors
    ///
    /// Returns an error if the slice length is not exactly `SECRET_SIZE` bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self, SecretError> {
        if data.len() != SECRET_SIZE {
            return Err(SecretError::InvalidSize(data.len()));
        }
        let mut buff = [0; SECRET_SIZE];
        buff.copy_from_slice(data);
        Ok(buff.into())
    }

    /// Get a reference to the secret key bytes
    pub fn bytes(&self) -> &[u8] {
        self.0.as_ref()
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(GenericArray::from_slice(&self.0))
    }

    /// Encrypt data using AES-256-GCM with no associated data
    ///
    /// A random nonce is drawn for each call, so encrypting the same data
    /// twice never yields the same ciphertext.
    ///
    /// # Errors
    ///
    /// Returns an error if the RNG fails or the payload exceeds the GCM limit.
    pub fn encrypt(&self, data: &[u8]) -> Result<Ciphertext, SecretError> {
        let mut nonce = [0u8; NONCE_SIZE];
        getrandom::getrandom(&mut nonce).map_err(SecretError::Random)?;

        let mut buffer = data.to_vec();
        let tag = self
            .cipher()
            .encrypt_in_place_detached(GenericArray::from_slice(&nonce), b"", &mut buffer)
            .map_err(|_| SecretError::Encrypt)?;

        let mut tag_bytes = [0u8; TAG_SIZE];
        tag_bytes.copy_from_slice(tag.as_slice());

        Ok(Ciphertext {
            nonce,
            tag: tag_bytes,
            data: buffer,
        })
    }

    /// Decrypt data using AES-256-GCM
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The nonce or tag has the wrong length
    /// - Authentication fails (data was tampered with or wrong key)
    pub fn decrypt(&self, nonce: &[u8], tag: &[u8], data: &[u8]) -> Result<Vec<u8>, SecretError> {
        if nonce.len() != NONCE_SIZE {
            return Err(SecretError::InvalidNonce(nonce.len()));
        }
        if tag.len() != TAG_SIZE {
            return Err(SecretError::InvalidTag(tag.len()));
        }

        let mut buffer = data.to_vec();
        let result = self.cipher().decrypt_in_place_detached(
            GenericArray::from_slice(nonce),
            b"",
            &mut buffer,
            GenericArray::from_slice(tag),
        );

        if result.is_err() {
            buffer.zeroize();
            return Err(SecretError::Decrypt);
        }
        Ok(buffer)
    }
}

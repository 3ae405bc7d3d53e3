//! Cryptographic primitives for MedSeal
//!
//! This module provides the building blocks of the sealed-package protocol:
//!
//! - **Key Material**: RSA recipient keys and Ed25519 sender keys, parsed from PEM
//! - **Encryption**: AES-256-GCM under a fresh one-time `Secret` per package
//! - **Key Wrap**: RSA-OAEP-SHA256 encryption of the one-time secret for the recipient
//!
//! # Security Model
//!
//! ## Recipient Keys
//! Recipients publish an RSA public key (SPKI PEM, at least 2048 bits). Only
//! the matching private key can unwrap a package's content secret.
//!
//! ## Sender Keys
//! The sender holds an Ed25519 `SigningKey` and signs the canonical bytes of
//! every package. Ed25519 is deterministic and hash-free, so there is no
//! per-signature nonce to get wrong.
//!
//! ## Content Encryption
//! Every package has its own `Secret`, used exactly once with a random
//! 96-bit nonce. Secrets are zeroized on drop and never leave the process
//! unwrapped.

mod keys;
mod secret;
mod wrapped_key;

pub use ed25519_dalek::Signature;
pub use keys::{
    KeyError, RecipientPrivateKey, RecipientPublicKey, SigningKey, VerifyingKey, MIN_RSA_BITS,
};
pub use secret::{Ciphertext, Secret, SecretError, NONCE_SIZE, SECRET_SIZE, TAG_SIZE};
pub use wrapped_key::{WrapError, WrappedKey};

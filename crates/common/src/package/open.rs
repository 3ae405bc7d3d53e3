use zeroize::Zeroizing;

use super::{DetachedSignature, PackageError, SealedPackage};
use crate::crypto::{RecipientPrivateKey, VerifyingKey, WrappedKey};

/// Verify and decrypt a decoded package
///
/// The package is re-serialized canonically and the signature checked over
/// those bytes before any key material is touched. Each step is a hard gate:
///
/// 1. version and algorithm triple ([`PackageError::UnsupportedVersion`])
/// 2. signature ([`PackageError::VerificationFailed`])
/// 3. key unwrap and AEAD decryption ([`PackageError::DecryptFailed`],
///    without saying which of the two failed)
///
/// The plaintext is returned in a buffer that is wiped when dropped.
pub fn open(
    package: &SealedPackage,
    signature: &DetachedSignature,
    sender: &VerifyingKey,
    recipient: &RecipientPrivateKey,
) -> Result<Zeroizing<Vec<u8>>, PackageError> {
    package.check_version()?;

    let bytes = package.to_canonical_bytes()?;
    verify(&bytes, signature, sender)?;

    decrypt(package, recipient)
}

/// Verify and decrypt a package from the bytes exactly as received
///
/// Preferred over [`open`] whenever the raw bytes are at hand, since the
/// signature is then checked over what the sender actually signed. Only
/// the version header is looked at before verification; the binary fields
/// are decoded afterwards.
pub fn open_bytes(
    bytes: &[u8],
    signature: &DetachedSignature,
    sender: &VerifyingKey,
    recipient: &RecipientPrivateKey,
) -> Result<Zeroizing<Vec<u8>>, PackageError> {
    SealedPackage::probe(bytes)?;
    verify(bytes, signature, sender)?;

    let package: SealedPackage =
        serde_json::from_slice(bytes).map_err(|e| PackageError::Malformed(e.to_string()))?;

    decrypt(&package, recipient)
}

fn verify(
    bytes: &[u8],
    signature: &DetachedSignature,
    sender: &VerifyingKey,
) -> Result<(), PackageError> {
    sender
        .verify(bytes, signature.inner())
        .map_err(|_| PackageError::VerificationFailed)
}

fn decrypt(
    package: &SealedPackage,
    recipient: &RecipientPrivateKey,
) -> Result<Zeroizing<Vec<u8>>, PackageError> {
    let secret = WrappedKey::from(package.wrapped_key.clone())
        .recover(recipient)
        .map_err(|_| PackageError::DecryptFailed)?;

    let plaintext = secret
        .decrypt(&package.nonce, &package.tag, &package.ciphertext)
        .map_err(|_| PackageError::DecryptFailed)?;

    Ok(Zeroizing::new(plaintext))
}

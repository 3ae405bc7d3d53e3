use super::{CryptoStage, DetachedSignature, PackageError, SealedPackage};
use crate::crypto::{RecipientPublicKey, Secret, SecretError, SigningKey, WrappedKey};

/// Output of [`seal`]
///
/// `bytes` is the canonical serialization of `package`, exactly as signed.
/// Write or send these bytes rather than re-serializing the package.
#[derive(Debug, Clone)]
pub struct Sealed {
    pub package: SealedPackage,
    pub bytes: Vec<u8>,
    pub signature: DetachedSignature,
}

/// Encrypt `plaintext` for `recipient` and sign the result as `signer`
///
/// A fresh content secret and nonce are drawn for every call, so sealing
/// the same input twice yields two different packages. The secret is wiped
/// before this function returns, on success and failure alike.
///
/// # Errors
///
/// Returns [`PackageError::Crypto`] naming the stage that failed. None of
/// these are transient; retrying with the same inputs will not help.
pub fn seal(
    plaintext: &[u8],
    recipient: &RecipientPublicKey,
    signer: &SigningKey,
) -> Result<Sealed, PackageError> {
    let secret =
        Secret::generate().map_err(|e| PackageError::crypto(CryptoStage::KeyGeneration, e))?;

    let ciphertext = secret.encrypt(plaintext).map_err(|e| match e {
        SecretError::Random(_) => PackageError::crypto(CryptoStage::KeyGeneration, e),
        _ => PackageError::crypto(CryptoStage::SymmetricEncryption, e),
    })?;

    let wrapped_key = WrappedKey::new(&secret, recipient)
        .map_err(|e| PackageError::crypto(CryptoStage::KeyWrap, e))?;
    drop(secret);

    let package = SealedPackage::v1(ciphertext, wrapped_key);
    let bytes = package.to_canonical_bytes()?;

    let signature = signer
        .sign(&bytes)
        .map(DetachedSignature::from)
        .map_err(|e| PackageError::crypto(CryptoStage::Signing, e))?;

    tracing::debug!(
        plaintext_len = plaintext.len(),
        package_len = bytes.len(),
        "sealed package"
    );

    Ok(Sealed {
        package,
        bytes,
        signature,
    })
}

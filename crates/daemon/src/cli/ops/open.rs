use std::path::PathBuf;

use clap::Args;

use common::crypto::{RecipientPrivateKey, VerifyingKey};
use common::package::{open_bytes, DetachedSignature, PackageError};

/// Verify and decrypt a received package
#[derive(Args, Debug, Clone)]
pub struct Open {
    /// The `.package.json` file, exactly as received
    #[arg(long)]
    pub package: PathBuf,

    /// The `.signature.b64.txt` file
    #[arg(long)]
    pub signature: PathBuf,

    /// Sender Ed25519 public key (SPKI PEM)
    #[arg(long)]
    pub sender_key: PathBuf,

    /// Recipient RSA private key (PKCS#8 or PKCS#1 PEM)
    #[arg(long)]
    pub recipient_key: PathBuf,

    /// Where to write the plaintext
    #[arg(long)]
    pub output: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error("could not read {0}: {1}")]
    Read(String, std::io::Error),
    #[error("could not write {0}: {1}")]
    Write(String, std::io::Error),
    /// Reported through the redacted form so a forged package and a
    /// corrupted one read the same
    #[error("{}", .0.redact())]
    Package(#[from] PackageError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Open {
    type Error = OpenError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let read = |path: &PathBuf| {
            let path = path.clone();
            async move {
                tokio::fs::read(&path)
                    .await
                    .map_err(|e| OpenError::Read(path.display().to_string(), e))
            }
        };

        let package = read(&self.package).await?;
        let signature_b64 = String::from_utf8_lossy(&read(&self.signature).await?).into_owned();
        let sender_pem = String::from_utf8_lossy(&read(&self.sender_key).await?).into_owned();
        let recipient_pem =
            zeroize::Zeroizing::new(String::from_utf8_lossy(&read(&self.recipient_key).await?).into_owned());

        let signature = DetachedSignature::from_base64(&signature_b64)?;
        let sender = VerifyingKey::from_pem(&sender_pem).map_err(PackageError::from)?;
        let recipient = RecipientPrivateKey::from_pem(&recipient_pem).map_err(PackageError::from)?;

        let plaintext = open_bytes(&package, &signature, &sender, &recipient)?;
        tokio::fs::write(&self.output, plaintext.as_slice())
            .await
            .map_err(|e| OpenError::Write(self.output.display().to_string(), e))?;

        Ok(format!(
            "signature verified, {} bytes written to {}",
            plaintext.len(),
            self.output.display()
        ))
    }
}

use std::path::{Path, PathBuf};

use clap::Args;

use common::crypto::{RecipientPublicKey, SigningKey};
use common::package::{seal, PackageError};
use common::validate::KeyMaterial;

/// Seal a file locally, without the daemon
#[derive(Args, Debug, Clone)]
pub struct Seal {
    /// File to seal
    #[arg(long)]
    pub input: PathBuf,

    /// Recipient RSA public key (SPKI PEM)
    #[arg(long)]
    pub recipient_key: PathBuf,

    /// Sender Ed25519 private key (PKCS#8 PEM)
    #[arg(long)]
    pub signing_key: PathBuf,

    /// Where to write the package and signature
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Artifact name prefix (defaults to the input file stem)
    #[arg(long)]
    pub stem: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SealError {
    #[error("could not read {0}: {1}")]
    Read(String, std::io::Error),
    #[error("could not write {0}: {1}")]
    Write(String, std::io::Error),
    #[error("{0}")]
    Package(#[from] PackageError),
}

async fn read(path: &Path) -> Result<Vec<u8>, SealError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| SealError::Read(path.display().to_string(), e))
}

async fn read_text(path: &Path) -> Result<String, SealError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SealError::Read(path.display().to_string(), e))
}

async fn write(path: &Path, bytes: &[u8]) -> Result<(), SealError> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| SealError::Write(path.display().to_string(), e))
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Seal {
    type Error = SealError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let recipient_pem = read_text(&self.recipient_key).await?;
        let material = KeyMaterial::parse(&recipient_pem).map_err(PackageError::from)?;
        let recipient =
            RecipientPublicKey::from_key_material(&material).map_err(PackageError::from)?;

        let signer = SigningKey::from_pem(&read_text(&self.signing_key).await?)
            .map_err(PackageError::from)?;

        let plaintext = zeroize::Zeroizing::new(read(&self.input).await?);
        let sealed = seal(&plaintext, &recipient, &signer)?;

        let stem = self.stem.clone().unwrap_or_else(|| {
            self.input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "sealed".to_string())
        });
        let package_path = self.out_dir.join(format!("{}.package.json", stem));
        let signature_path = self.out_dir.join(format!("{}.signature.b64.txt", stem));

        tokio::fs::create_dir_all(&self.out_dir)
            .await
            .map_err(|e| SealError::Write(self.out_dir.display().to_string(), e))?;
        write(&package_path, &sealed.bytes).await?;
        write(&signature_path, sealed.signature.to_base64().as_bytes()).await?;

        Ok(format!(
            "package:   {}\nsignature: {}",
            package_path.display(),
            signature_path.display()
        ))
    }
}

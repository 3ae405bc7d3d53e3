use std::path::PathBuf;

use clap::Args;

use common::crypto::{RecipientPublicKey, VerifyingKey};
use common::validate::{KeyMaterial, ValidationError};

/// Check a public key PEM the way the key directory does before publishing
#[derive(Args, Debug, Clone)]
pub struct Validate {
    /// PEM file to check
    pub pem: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ValidateError {
    #[error("could not read {0}: {1}")]
    Read(String, std::io::Error),
    #[error("rejected: {0}")]
    Rejected(#[from] ValidationError),
}

/// Which protocol role the key could fill, if it parses at all
fn describe(material: &KeyMaterial) -> String {
    if let Ok(key) = RecipientPublicKey::from_key_material(material) {
        return format!("RSA-{} recipient key", key.bits());
    }
    if VerifyingKey::from_pem(material.as_str()).is_ok() {
        return "Ed25519 sender key".to_string();
    }
    "key body not recognized as RSA or Ed25519".to_string()
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Validate {
    type Error = ValidateError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let pem = tokio::fs::read_to_string(&self.pem)
            .await
            .map_err(|e| ValidateError::Read(self.pem.display().to_string(), e))?;

        let material = KeyMaterial::parse(&pem)?;
        Ok(format!("accepted ({})", describe(&material)))
    }
}

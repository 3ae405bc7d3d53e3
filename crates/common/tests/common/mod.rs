//! Shared test utilities for protocol integration tests
#![allow(dead_code)]

use common::crypto::{RecipientPrivateKey, RecipientPublicKey, SigningKey, VerifyingKey};

pub const ALICE_RSA_PUBLIC: &str = include_str!("../fixtures/alice_rsa_public.pem");
pub const ALICE_RSA_PRIVATE: &str = include_str!("../fixtures/alice_rsa_private.pem");
pub const BOB_RSA_PUBLIC: &str = include_str!("../fixtures/bob_rsa_public.pem");
pub const BOB_RSA_PRIVATE: &str = include_str!("../fixtures/bob_rsa_private.pem");
pub const CLINIC_ED25519_PUBLIC: &str = include_str!("../fixtures/clinic_ed25519_public.pem");
pub const CLINIC_ED25519_PRIVATE: &str = include_str!("../fixtures/clinic_ed25519_private.pem");
pub const OTHER_ED25519_PUBLIC: &str = include_str!("../fixtures/other_ed25519_public.pem");
pub const OTHER_ED25519_PRIVATE: &str = include_str!("../fixtures/other_ed25519_private.pem");

pub const INTEROP_PACKAGE: &[u8] = include_bytes!("../fixtures/interop.package.json");
pub const INTEROP_SIGNATURE_B64: &str = include_str!("../fixtures/interop.signature.b64.txt");
pub const INTEROP_PLAINTEXT: &[u8] = include_bytes!("../fixtures/interop.plaintext.txt");

/// A recipient key pair
pub struct Recipient {
    pub public: RecipientPublicKey,
    pub private: RecipientPrivateKey,
}

/// A sender key pair
pub struct Sender {
    pub signing: SigningKey,
    pub verifying: VerifyingKey,
}

pub fn alice() -> Recipient {
    Recipient {
        public: RecipientPublicKey::from_pem(ALICE_RSA_PUBLIC).unwrap(),
        private: RecipientPrivateKey::from_pem(ALICE_RSA_PRIVATE).unwrap(),
    }
}

pub fn bob() -> Recipient {
    Recipient {
        public: RecipientPublicKey::from_pem(BOB_RSA_PUBLIC).unwrap(),
        private: RecipientPrivateKey::from_pem(BOB_RSA_PRIVATE).unwrap(),
    }
}

pub fn clinic() -> Sender {
    Sender {
        signing: SigningKey::from_pem(CLINIC_ED25519_PRIVATE).unwrap(),
        verifying: VerifyingKey::from_pem(CLINIC_ED25519_PUBLIC).unwrap(),
    }
}

pub fn other_sender() -> Sender {
    Sender {
        signing: SigningKey::from_pem(OTHER_ED25519_PRIVATE).unwrap(),
        verifying: VerifyingKey::from_pem(OTHER_ED25519_PUBLIC).unwrap(),
    }
}

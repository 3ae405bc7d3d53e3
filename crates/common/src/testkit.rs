//! Fixed key material for tests
//!
//! Two RSA-2048 recipients (alice, bob) and two Ed25519 senders (clinic,
//! other), all in the PEM encodings the key directory accepts, plus a
//! package sealed for alice by clinic with an independent implementation.

pub const ALICE_RSA_PUBLIC: &str = include_str!("../tests/fixtures/alice_rsa_public.pem");
pub const ALICE_RSA_PRIVATE: &str = include_str!("../tests/fixtures/alice_rsa_private.pem");
pub const BOB_RSA_PUBLIC: &str = include_str!("../tests/fixtures/bob_rsa_public.pem");
pub const BOB_RSA_PRIVATE: &str = include_str!("../tests/fixtures/bob_rsa_private.pem");

pub const CLINIC_ED25519_PUBLIC: &str = include_str!("../tests/fixtures/clinic_ed25519_public.pem");
pub const CLINIC_ED25519_PRIVATE: &str =
    include_str!("../tests/fixtures/clinic_ed25519_private.pem");
pub const OTHER_ED25519_PUBLIC: &str = include_str!("../tests/fixtures/other_ed25519_public.pem");
pub const OTHER_ED25519_PRIVATE: &str =
    include_str!("../tests/fixtures/other_ed25519_private.pem");

pub const INTEROP_PACKAGE: &[u8] = include_bytes!("../tests/fixtures/interop.package.json");
pub const INTEROP_SIGNATURE_B64: &str =
    include_str!("../tests/fixtures/interop.signature.b64.txt");
pub const INTEROP_PLAINTEXT: &[u8] = include_bytes!("../tests/fixtures/interop.plaintext.txt");

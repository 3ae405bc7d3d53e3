//! Sealing then opening recovers the payload, and nothing else does
mod common;

use ::common::package::{open, open_bytes, seal, PackageError};

#[test]
fn test_roundtrip_various_payloads() {
    let alice = common::alice();
    let clinic = common::clinic();

    let large = vec![0xA5u8; 1024 * 1024];
    let payloads: [&[u8]; 4] = [b"", b"a", b"Patient 0042: HbA1c 5.4%", &large];

    for payload in payloads {
        let sealed = seal(payload, &alice.public, &clinic.signing).unwrap();

        let opened = open(
            &sealed.package,
            &sealed.signature,
            &clinic.verifying,
            &alice.private,
        )
        .unwrap();
        assert_eq!(opened.as_slice(), payload);

        let opened = open_bytes(
            &sealed.bytes,
            &sealed.signature,
            &clinic.verifying,
            &alice.private,
        )
        .unwrap();
        assert_eq!(opened.as_slice(), payload);
    }
}

#[test]
fn test_two_seals_differ_but_both_open() {
    let alice = common::alice();
    let clinic = common::clinic();
    let payload = b"identical input";

    let a = seal(payload, &alice.public, &clinic.signing).unwrap();
    let b = seal(payload, &alice.public, &clinic.signing).unwrap();

    assert_ne!(a.package.nonce, b.package.nonce);
    assert_ne!(a.package.wrapped_key, b.package.wrapped_key);
    assert_ne!(a.package.ciphertext, b.package.ciphertext);
    assert_ne!(a.signature, b.signature);

    for sealed in [a, b] {
        let opened = open_bytes(
            &sealed.bytes,
            &sealed.signature,
            &clinic.verifying,
            &alice.private,
        )
        .unwrap();
        assert_eq!(opened.as_slice(), payload);
    }
}

#[test]
fn test_wrong_recipient_key_fails_decrypt() {
    let alice = common::alice();
    let bob = common::bob();
    let clinic = common::clinic();

    let sealed = seal(b"for alice only", &alice.public, &clinic.signing).unwrap();
    let result = open_bytes(
        &sealed.bytes,
        &sealed.signature,
        &clinic.verifying,
        &bob.private,
    );
    assert!(matches!(result, Err(PackageError::DecryptFailed)));
}

#[test]
fn test_signature_bound_to_sender() {
    let alice = common::alice();
    let clinic = common::clinic();
    let other = common::other_sender();

    let sealed = seal(b"signed by clinic", &alice.public, &clinic.signing).unwrap();

    let result = open(
        &sealed.package,
        &sealed.signature,
        &other.verifying,
        &alice.private,
    );
    assert!(matches!(result, Err(PackageError::VerificationFailed)));

    // A signature from another sender over the same bytes does not pass as clinic's
    let forged = ::common::package::DetachedSignature::from(
        other.signing.sign(&sealed.bytes).unwrap(),
    );
    let result = open_bytes(&sealed.bytes, &forged, &clinic.verifying, &alice.private);
    assert!(matches!(result, Err(PackageError::VerificationFailed)));
}

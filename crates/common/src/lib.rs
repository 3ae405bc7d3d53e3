/**
 * Cryptographic types and operations.
 *  - RSA recipient keys and Ed25519 sender keys
 *  - One-time AES-256-GCM secrets
 *  - RSA-OAEP key wrap
 */
pub mod crypto;
/**
 * Published public keys and how recipients
 *  are resolved from a uid or an email.
 */
pub mod directory;
/**
 * Orchestration: resolve a recipient, seal,
 *  and hand the artifacts to a transport.
 */
pub mod dispatch;
/**
 * The sealed package: canonical wire format,
 *  sealing, verify-then-decrypt opening, and
 *  the error taxonomy with its redaction step.
 */
pub mod package;
/**
 * How sealed packages leave the process.
 */
pub mod transport;
/**
 * Envelope checks for untrusted public key PEMs.
 */
pub mod validate;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

pub mod prelude {
    pub use crate::crypto::{RecipientPrivateKey, RecipientPublicKey, SigningKey, VerifyingKey};
    pub use crate::directory::{KeyDirectory, KeyQuery, KeyRecord, KeyType, NewKeyRecord, Role};
    pub use crate::dispatch::{DispatchError, DispatchReceipt, DispatchRequest, Dispatcher};
    pub use crate::package::{
        open, open_bytes, seal, DetachedSignature, PackageError, PublicError, Sealed,
        SealedPackage,
    };
    pub use crate::transport::{Delivery, DeliveryId, Transport, TransportError};
    pub use crate::validate::{validate_public_key_pem, KeyMaterial, ValidationError};
}

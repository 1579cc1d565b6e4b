//! Ed25519 keypairs and signature verification.

use std::fmt;

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

use crate::error::{CryptoError, Result};

/// Length of a private key seed.
pub const SEED_LENGTH: usize = ed25519_dalek::SECRET_KEY_LENGTH;
/// Length of a public key.
pub const PUBLIC_KEY_LENGTH: usize = ed25519_dalek::PUBLIC_KEY_LENGTH;
/// Length of a signature.
pub const SIGNATURE_LENGTH: usize = ed25519_dalek::SIGNATURE_LENGTH;

/// A keypair for signing chain content.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            signing_key: SigningKey::generate(&mut rng),
        }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; SEED_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// The private seed.
    pub fn seed(&self) -> [u8; SEED_LENGTH] {
        self.signing_key.to_bytes()
    }

    pub fn public_key(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.signing_key.verifying_key().to_bytes()
    }

    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_LENGTH] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({}...)", &hex::encode(self.public_key())[..16])
    }
}

/// Verify an Ed25519 `signature` over `message`.
///
/// Auditing helper for output of `CryptoProvider::sign`. Ledgers never call
/// it on read.
pub fn verify_signature(public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<()> {
    let public_key: [u8; PUBLIC_KEY_LENGTH] = public_key
        .try_into()
        .map_err(|_| CryptoError::InvalidPublicKey)?;
    let verifying_key =
        VerifyingKey::from_bytes(&public_key).map_err(|_| CryptoError::InvalidPublicKey)?;

    let signature: [u8; SIGNATURE_LENGTH] = signature
        .try_into()
        .map_err(|_| CryptoError::InvalidSignatureLength(signature.len()))?;

    verifying_key
        .verify(message, &Signature::from_bytes(&signature))
        .map_err(|_| CryptoError::SignatureMismatch)
}

//! The crypto capability consumed by card parsing, signing, and verification.
//!
//! Cards never reach for a global crypto backend. Every operation that needs
//! hashing, key import, or signatures takes a [`CardCrypto`] implementation,
//! so tests can swap in deterministic fakes. [`Ed25519CardCrypto`] is the
//! production implementation (Ed25519 keys, SHA-512 digests).

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use sha2::{Digest, Sha512};
use std::fmt;

use crate::error::CryptoError;

/// Length of a SHA-512 digest in bytes.
pub const SHA512_LEN: usize = 64;

/// Cryptographic operations a card pipeline depends on.
///
/// Implementations must be safe to call from any thread. Calls may block on
/// the underlying primitive; there is no cancellation at this layer.
pub trait CardCrypto: Send + Sync {
    /// Opaque handle for an imported public key.
    type PublicKey: Clone + fmt::Debug + Send + Sync;

    /// Private key material used by the card creation flow.
    type PrivateKey;

    /// Import a public key from its raw byte encoding.
    fn import_public_key(&self, bytes: &[u8]) -> Result<Self::PublicKey, CryptoError>;

    /// Export a public key back to its raw byte encoding.
    fn export_public_key(&self, key: &Self::PublicKey) -> Vec<u8>;

    /// Compute the SHA-512 digest of `data`.
    fn generate_sha512(&self, data: &[u8]) -> [u8; SHA512_LEN];

    /// Sign `data` with the given private key.
    fn generate_signature(
        &self,
        data: &[u8],
        private_key: &Self::PrivateKey,
    ) -> Result<Vec<u8>, CryptoError>;

    /// Check `signature` over `data` against a public key.
    fn verify_signature(&self, signature: &[u8], data: &[u8], public_key: &Self::PublicKey)
        -> bool;
}

/// A 32-byte Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey(pub [u8; 32]);

impl Ed25519PublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Verify a signature over a message.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.0) else {
            return false;
        };
        let Ok(sig) = Signature::from_slice(signature) else {
            return false;
        };
        verifying_key.verify(message, &sig).is_ok()
    }
}

impl fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519Pub({})", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Ed25519PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// An Ed25519 keypair for signing raw card models.
///
/// This wraps ed25519-dalek's SigningKey.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let signing_key = SigningKey::generate(&mut rng);
        Self { signing_key }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Get the public key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.public_key())
    }
}

/// Production crypto capability: Ed25519 signatures, SHA-512 digests.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519CardCrypto;

impl CardCrypto for Ed25519CardCrypto {
    type PublicKey = Ed25519PublicKey;
    type PrivateKey = Keypair;

    fn import_public_key(&self, bytes: &[u8]) -> Result<Ed25519PublicKey, CryptoError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| {
            CryptoError::KeyImport(format!("expected 32 bytes, got {}", bytes.len()))
        })?;
        VerifyingKey::from_bytes(&arr).map_err(|e| CryptoError::KeyImport(e.to_string()))?;
        Ok(Ed25519PublicKey(arr))
    }

    fn export_public_key(&self, key: &Ed25519PublicKey) -> Vec<u8> {
        key.0.to_vec()
    }

    fn generate_sha512(&self, data: &[u8]) -> [u8; SHA512_LEN] {
        let digest = Sha512::digest(data);
        let mut out = [0u8; SHA512_LEN];
        out.copy_from_slice(&digest);
        out
    }

    fn generate_signature(&self, data: &[u8], private_key: &Keypair) -> Result<Vec<u8>, CryptoError> {
        Ok(private_key.sign(data).to_vec())
    }

    fn verify_signature(&self, signature: &[u8], data: &[u8], public_key: &Ed25519PublicKey) -> bool {
        public_key.verify(data, signature)
    }
}

//! A deterministic crypto capability for tests.
//!
//! Hashing is real SHA-512, so identifiers match production. Keys are
//! arbitrary byte strings and a "signature" is a keyed digest, which lets
//! tests build and verify cards without Ed25519 key material.

use std::sync::atomic::{AtomicUsize, Ordering};

use cardchain_core::{CardCrypto, CryptoError, SHA512_LEN};
use sha2::{Digest, Sha512};

/// A fake key. The same value serves as public and private key.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FakeKey(pub Vec<u8>);

impl std::fmt::Debug for FakeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FakeKey({})", hex::encode(&self.0))
    }
}

/// Deterministic crypto fake.
///
/// Key import accepts any non-empty byte string except those listed in
/// `rejected_keys`. Digest calls are counted.
#[derive(Debug, Default)]
pub struct FakeCrypto {
    rejected_keys: Vec<Vec<u8>>,
    digest_calls: AtomicUsize,
}

impl FakeCrypto {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make key import fail for `key`.
    pub fn rejecting(mut self, key: &[u8]) -> Self {
        self.rejected_keys.push(key.to_vec());
        self
    }

    /// Number of SHA-512 digests computed so far.
    pub fn digest_calls(&self) -> usize {
        self.digest_calls.load(Ordering::Relaxed)
    }

    fn keyed_digest(key: &[u8], data: &[u8]) -> Vec<u8> {
        let mut hasher = Sha512::new();
        hasher.update((key.len() as u64).to_be_bytes());
        hasher.update(key);
        hasher.update(data);
        hasher.finalize().to_vec()
    }
}

impl CardCrypto for FakeCrypto {
    type PublicKey = FakeKey;
    type PrivateKey = FakeKey;

    fn import_public_key(&self, bytes: &[u8]) -> Result<FakeKey, CryptoError> {
        if bytes.is_empty() {
            return Err(CryptoError::KeyImport("empty key".into()));
        }
        if self.rejected_keys.iter().any(|k| k == bytes) {
            return Err(CryptoError::KeyImport("key rejected by fake".into()));
        }
        Ok(FakeKey(bytes.to_vec()))
    }

    fn export_public_key(&self, key: &FakeKey) -> Vec<u8> {
        key.0.clone()
    }

    fn generate_sha512(&self, data: &[u8]) -> [u8; SHA512_LEN] {
        self.digest_calls.fetch_add(1, Ordering::Relaxed);
        let mut out = [0u8; SHA512_LEN];
        out.copy_from_slice(&Sha512::digest(data));
        out
    }

    fn generate_signature(&self, data: &[u8], private_key: &FakeKey) -> Result<Vec<u8>, CryptoError> {
        if private_key.0.is_empty() {
            return Err(CryptoError::Signing("empty key".into()));
        }
        Ok(Self::keyed_digest(&private_key.0, data))
    }

    fn verify_signature(&self, signature: &[u8], data: &[u8], public_key: &FakeKey) -> bool {
        signature == Self::keyed_digest(&public_key.0, data).as_slice()
    }
}

//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use cardchain_core::{
    Card, CardContent, CardId, Ed25519CardCrypto, Ed25519PublicKey, Keypair, ModelSigner,
    RawSignedModel,
};
use cardchain_store::MemoryCardStore;

/// A test fixture with a keypair and memory store.
pub struct TestFixture {
    pub keypair: Keypair,
    pub crypto: Ed25519CardCrypto,
    pub store: MemoryCardStore<Ed25519PublicKey>,
}

impl TestFixture {
    /// Create a new test fixture with a random keypair.
    pub fn new() -> Self {
        Self::from_keypair(Keypair::generate())
    }

    /// Create with a deterministic keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self::from_keypair(Keypair::from_seed(&seed))
    }

    fn from_keypair(keypair: Keypair) -> Self {
        Self {
            keypair,
            crypto: Ed25519CardCrypto,
            store: MemoryCardStore::new(),
        }
    }

    /// Get the keypair's public key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        self.keypair.public_key()
    }

    /// Create a self-signed card for `identity`.
    pub fn make_card(&self, identity: &str, created_at: i64) -> RawSignedModel {
        let content = CardContent::new(identity, self.public_key().as_bytes(), created_at);
        self.sign_content(&content)
    }

    /// Create a self-signed card that replaces `previous`.
    pub fn make_successor(
        &self,
        identity: &str,
        previous: &CardId,
        created_at: i64,
    ) -> RawSignedModel {
        let content = CardContent::new(identity, self.public_key().as_bytes(), created_at)
            .with_previous(previous);
        self.sign_content(&content)
    }

    /// Add a signature from another party.
    pub fn countersign(&self, raw: &mut RawSignedModel, signer: &str, keypair: &Keypair) {
        ModelSigner::new(&self.crypto)
            .sign(raw, signer, keypair, None)
            .expect("fixture countersign");
    }

    /// Parse a model that is known to be valid.
    pub fn parse(&self, raw: &RawSignedModel) -> Card<Ed25519PublicKey> {
        Card::parse(&self.crypto, raw).expect("fixture card parses")
    }

    fn sign_content(&self, content: &CardContent) -> RawSignedModel {
        ModelSigner::new(&self.crypto)
            .generate(content, &self.keypair, None)
            .expect("fixture signing")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple test fixtures for multi-party tests.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            TestFixture::with_seed(seed)
        })
        .collect()
}

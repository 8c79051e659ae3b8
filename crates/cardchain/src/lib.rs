//! # Cardchain
//!
//! The unified API for Cardchain: verifiable identity cards binding an
//! identity to a public key, signed by one or more parties, and chained
//! across key rotations.
//!
//! ## Key Concepts
//!
//! - **Card**: Immutable. Identified by the SHA-512 prefix of its content snapshot.
//! - **Raw signed model**: The wire envelope. Signatures can only be appended.
//! - **Rotation**: A new card names its predecessor; the predecessor becomes outdated.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cardchain::{CardManager, CardManagerConfig, ImportResult};
//! use cardchain::core::{Ed25519CardCrypto, RawSignedModel};
//! use cardchain::store::SqliteCardStore;
//!
//! fn example(wire_json: &str) {
//!     let store = SqliteCardStore::open("cards.db", Ed25519CardCrypto).unwrap();
//!     let manager = CardManager::new(Ed25519CardCrypto, store, CardManagerConfig::default()).unwrap();
//!
//!     match manager.import_json(wire_json).unwrap() {
//!         ImportResult::Accepted(id) => println!("stored {}", id),
//!         ImportResult::Duplicate(id) => println!("already had {}", id),
//!         ImportResult::Rejected(reason) => println!("rejected: {}", reason),
//!     }
//!
//!     for card in manager.current_cards("alice").unwrap() {
//!         println!("{} {}", card.identifier(), card.created_at());
//!     }
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `cardchain::core` - Core primitives (Card, RawSignedModel, CardId, etc.)
//! - `cardchain::store` - Card index abstraction and SQLite

pub mod config;
pub mod error;
pub mod manager;

// Re-export component crates
pub use cardchain_core as core;
pub use cardchain_store as store;

// Re-export main types for convenience
pub use config::CardManagerConfig;
pub use error::{ManagerError, Result};
pub use manager::{CardManager, ImportResult};

// Re-export commonly used core types
pub use cardchain_core::{
    Card, CardContent, CardCrypto, CardError, CardId, CardSignature, Ed25519CardCrypto,
    Ed25519PublicKey, Keypair, ModelSigner, RawSignature, RawSignedModel, SignerType,
};

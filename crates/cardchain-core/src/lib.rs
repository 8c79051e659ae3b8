//! # Cardchain Core
//!
//! Pure primitives for Cardchain: identity cards, their signed wire envelopes,
//! and the previous-card chain that links key rotations.
//!
//! This crate contains no I/O, no storage, no networking. Cryptography is
//! injected through the [`CardCrypto`] capability.
//!
//! ## Key Types
//!
//! - [`CardContent`] - The identity + public key + metadata payload
//! - [`RawSignedModel`] - Wire envelope: content snapshot + signature list
//! - [`Card`] - The validated, content-addressed identity record
//! - [`CardId`] - 32-byte identifier (first half of SHA-512 over the snapshot)
//!
//! ## Canonical Content
//!
//! Content snapshots are compact UTF-8 JSON. See [`canonical`] module.

pub mod canonical;
pub mod card;
pub mod chain;
pub mod content;
pub mod crypto;
pub mod error;
pub mod raw;
pub mod signature;
pub mod signer;
pub mod types;
pub mod verifier;

pub use canonical::{decode_content, decode_extra_fields, encode_content, encode_extra_fields};
pub use card::Card;
pub use chain::{resolve_all, resolve_previous, walk_chain, CardLookup, Resolution};
pub use content::{CardContent, CARD_VERSION};
pub use crypto::{CardCrypto, Ed25519CardCrypto, Ed25519PublicKey, Keypair, SHA512_LEN};
pub use error::{CardError, CryptoError, Result};
pub use raw::RawSignedModel;
pub use signature::{CardSignature, ExtraFields, RawSignature, SignerType};
pub use signer::{signed_message, ModelSigner};
pub use types::CardId;
pub use verifier::{CardVerifier, VerifierPolicy};

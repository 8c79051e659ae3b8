//! # Cardchain Testkit
//!
//! Testing utilities for Cardchain.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known snapshots with expected identifiers and signatures
//! - **Fake crypto**: A deterministic [`FakeCrypto`] capability with no real signatures
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Helper structs for setting up test scenarios
//!
//! ## Golden Vectors
//!
//! ```rust
//! use cardchain_testkit::vectors::{all_vectors, generate_raw_from_vector};
//! use cardchain_core::{Card, Ed25519CardCrypto};
//!
//! for vector in all_vectors() {
//!     let raw = generate_raw_from_vector(&vector);
//!     let card = Card::parse(&Ed25519CardCrypto, &raw).unwrap();
//!     assert_eq!(card.identifier().to_hex(), vector.expected_identifier);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use cardchain_testkit::generators::{raw_from_params, CardParams};
//!
//! proptest! {
//!     #[test]
//!     fn identifier_is_deterministic(params: CardParams) {
//!         let a = raw_from_params(&params);
//!         let b = raw_from_params(&params);
//!         prop_assert_eq!(a.content_snapshot(), b.content_snapshot());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use cardchain_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let raw = fixture.make_card("alice", 1_600_000_000);
//! let card = fixture.parse(&raw);
//! ```

pub mod fake;
pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fake::{FakeCrypto, FakeKey};
pub use fixtures::{multi_party_fixtures, TestFixture};
pub use generators::{raw_from_params, CardParams};
pub use vectors::{all_vectors, generate_raw_from_vector, verify_all_vectors, GoldenVector};

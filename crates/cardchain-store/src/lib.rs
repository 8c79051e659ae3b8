//! # Cardchain Store
//!
//! Card index abstraction. Provides a trait-based interface for holding
//! parsed cards with in-memory and SQLite implementations.
//!
//! ## Key Types
//!
//! - [`CardStore`] - The sync trait for all index operations
//! - [`MemoryCardStore`] - In-memory index, `RwLock<HashMap>`
//! - [`SqliteCardStore`] - SQLite-backed card cache
//! - [`InsertResult`] - Result of inserting a card
//!
//! ## Design Notes
//!
//! - **Idempotent inserts**: Inserting the same card twice returns `AlreadyExists`.
//!   Card ids are content-addressed, so there are no conflicts.
//! - **Chain upkeep**: Every insert links the new card to its predecessor and
//!   links known successors to the new card. A stored card is outdated iff some
//!   stored card names it as predecessor, regardless of arrival order.

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryCardStore;
pub use sqlite::SqliteCardStore;
pub use traits::{CardStore, InsertResult};

//! CardStore trait: the abstract interface for card indexes.

use cardchain_core::{walk_chain, Card, CardId};

use crate::error::Result;

/// Result of inserting a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertResult {
    /// Card was inserted (new).
    Inserted,
    /// Card already exists (idempotent, not an error).
    AlreadyExists,
}

/// The store trait: minimal interface for card indexes.
///
/// `K` is the public key handle of the crypto capability the cards were
/// parsed with. Implementations resolve the previous-card chain on insert, so
/// cards read back carry current `previous_card` and `is_outdated` state.
pub trait CardStore<K>: Send + Sync {
    // ─── Card Operations ───

    /// Insert a card.
    ///
    /// Returns `Inserted` if new, `AlreadyExists` if duplicate.
    fn insert(&self, card: Card<K>) -> Result<InsertResult>;

    /// Get a card by identifier.
    fn get(&self, id: &CardId) -> Result<Option<Card<K>>>;

    /// Check if a card exists.
    fn has(&self, id: &CardId) -> Result<bool>;

    /// All cards for an identity, outdated ones included.
    fn by_identity(&self, identity: &str) -> Result<Vec<Card<K>>>;

    /// Identifiers of cards that name `id` as their predecessor.
    fn successors_of(&self, id: &CardId) -> Result<Vec<CardId>>;

    /// All card identifiers.
    fn all_ids(&self) -> Result<Vec<CardId>>;

    /// Count of cards.
    fn count(&self) -> Result<usize>;

    // ─── Derived Queries ───

    /// Cards for an identity that nothing supersedes.
    fn current_by_identity(&self, identity: &str) -> Result<Vec<Card<K>>> {
        Ok(self
            .by_identity(identity)?
            .into_iter()
            .filter(|c| !c.is_outdated())
            .collect())
    }

    /// The rotation history ending at `id`, newest first.
    ///
    /// Empty if `id` is unknown. Stops at the first unresolved predecessor.
    fn chain(&self, id: &CardId) -> Result<Vec<Card<K>>> {
        let Some(start) = self.get(id)? else {
            return Ok(Vec::new());
        };

        let mut failure = None;
        let chain = walk_chain(start, |previous| match self.get(previous) {
            Ok(card) => card,
            Err(e) => {
                failure = Some(e);
                None
            }
        });

        match failure {
            Some(e) => Err(e),
            None => Ok(chain),
        }
    }
}

//! In-memory implementation of the CardStore trait.
//!
//! Cards live in a single `HashMap` index. Chain links are identifiers into
//! that index. All writes go through one `RwLock`, so at most one writer
//! touches a card's chain state at a time.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use cardchain_core::{resolve_previous, Card, CardId};

use crate::error::{Result, StoreError};
use crate::traits::{CardStore, InsertResult};

/// In-memory card index.
pub struct MemoryCardStore<K> {
    cards: RwLock<HashMap<CardId, Card<K>>>,
}

impl<K> MemoryCardStore<K> {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            cards: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<CardId, Card<K>>>> {
        self.cards
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<CardId, Card<K>>>> {
        self.cards
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

impl<K> Default for MemoryCardStore<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Send + Sync> CardStore<K> for MemoryCardStore<K> {
    fn insert(&self, mut card: Card<K>) -> Result<InsertResult> {
        let mut cards = self.write()?;
        let id = *card.identifier();

        if cards.contains_key(&id) {
            return Ok(InsertResult::AlreadyExists);
        }

        // Backward: link to a known predecessor.
        resolve_previous(&mut card, &mut *cards);
        cards.insert(id, card);

        // Forward: known cards that were waiting for this one.
        let waiting: Vec<CardId> = cards
            .values()
            .filter(|c| c.previous_card_id() == Some(&id) && c.previous_card().is_none())
            .map(|c| *c.identifier())
            .collect();

        for successor_id in waiting {
            if let Some(mut successor) = cards.remove(&successor_id) {
                resolve_previous(&mut successor, &mut *cards);
                cards.insert(successor_id, successor);
            }
        }

        tracing::debug!(card_id = %id, "Indexed card");
        Ok(InsertResult::Inserted)
    }

    fn get(&self, id: &CardId) -> Result<Option<Card<K>>> {
        Ok(self.read()?.get(id).cloned())
    }

    fn has(&self, id: &CardId) -> Result<bool> {
        Ok(self.read()?.contains_key(id))
    }

    fn by_identity(&self, identity: &str) -> Result<Vec<Card<K>>> {
        let cards = self.read()?;
        let mut matching: Vec<Card<K>> = cards
            .values()
            .filter(|c| c.identity() == identity)
            .cloned()
            .collect();
        matching.sort_by_key(|c| (c.created_at(), *c.identifier()));
        Ok(matching)
    }

    fn successors_of(&self, id: &CardId) -> Result<Vec<CardId>> {
        let cards = self.read()?;
        let mut ids: Vec<CardId> = cards
            .values()
            .filter(|c| c.previous_card_id() == Some(id))
            .map(|c| *c.identifier())
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn all_ids(&self) -> Result<Vec<CardId>> {
        let mut ids: Vec<CardId> = self.read()?.keys().copied().collect();
        ids.sort();
        Ok(ids)
    }

    fn count(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }
}

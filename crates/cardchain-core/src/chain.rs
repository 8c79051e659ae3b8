//! Previous-card chain resolution.
//!
//! Cards are kept in an index keyed by [`CardId`]. A resolved `previous_card`
//! is an identifier into that index, never an owned pointer, so long key
//! rotation histories cannot form ownership cycles.

use std::collections::{HashMap, HashSet};

use crate::card::Card;
use crate::types::CardId;

/// Mutable lookup of cards by identifier.
pub trait CardLookup<K> {
    /// Get a card for mutation.
    fn card_mut(&mut self, id: &CardId) -> Option<&mut Card<K>>;
}

impl<K> CardLookup<K> for HashMap<CardId, Card<K>> {
    fn card_mut(&mut self, id: &CardId) -> Option<&mut Card<K>> {
        self.get_mut(id)
    }
}

impl<K> CardLookup<K> for [Card<K>] {
    fn card_mut(&mut self, id: &CardId) -> Option<&mut Card<K>> {
        self.iter_mut().find(|c| c.identifier() == id)
    }
}

impl<K> CardLookup<K> for Vec<Card<K>> {
    fn card_mut(&mut self, id: &CardId) -> Option<&mut Card<K>> {
        self.as_mut_slice().card_mut(id)
    }
}

/// Outcome of resolving one card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The card names no predecessor.
    NoPrevious,
    /// The predecessor was found, linked, and marked outdated.
    Linked(CardId),
    /// The predecessor is not known yet. Not an error.
    Unresolved(CardId),
    /// The content names a predecessor with a string that is not a card
    /// identifier, so no lookup can ever find it.
    Unresolvable,
}

/// Link a card to its predecessor and mark the predecessor outdated.
///
/// Resolving again against the same lookup leaves the same state. An
/// unresolved predecessor leaves any existing link untouched.
pub fn resolve_previous<K, L>(card: &mut Card<K>, lookup: &mut L) -> Resolution
where
    L: CardLookup<K> + ?Sized,
{
    let Some(previous_id) = card.previous_card_id().copied() else {
        if card.previous_card_ref().is_some() {
            return Resolution::Unresolvable;
        }
        return Resolution::NoPrevious;
    };

    // A card naming itself cannot supersede itself.
    if previous_id == *card.identifier() {
        return Resolution::Unresolved(previous_id);
    }

    match lookup.card_mut(&previous_id) {
        Some(previous) => {
            previous.mark_outdated();
            card.link_previous(previous_id);
            tracing::trace!(card_id = %card.identifier(), previous = %previous_id, "Linked previous card");
            Resolution::Linked(previous_id)
        }
        None => {
            tracing::trace!(card_id = %card.identifier(), previous = %previous_id, "Previous card not known yet");
            Resolution::Unresolved(previous_id)
        }
    }
}

/// Resolve every card in an index against the rest of the index.
///
/// Returns the number of cards that ended up linked.
pub fn resolve_all<K>(cards: &mut HashMap<CardId, Card<K>>) -> usize {
    let ids: Vec<CardId> = cards.keys().copied().collect();
    let mut linked = 0;

    for id in ids {
        let Some(mut card) = cards.remove(&id) else {
            continue;
        };
        if let Resolution::Linked(_) = resolve_previous(&mut card, cards) {
            linked += 1;
        }
        cards.insert(id, card);
    }

    linked
}

/// Walk `previous_card` links backward from `start`, newest first.
///
/// Stops at a card with no resolved predecessor, at a predecessor `fetch`
/// cannot produce, or when a card would repeat.
pub fn walk_chain<K, F>(start: Card<K>, mut fetch: F) -> Vec<Card<K>>
where
    F: FnMut(&CardId) -> Option<Card<K>>,
{
    let mut seen = HashSet::new();
    let mut chain = Vec::new();
    let mut current = Some(start);

    while let Some(card) = current.take() {
        if !seen.insert(*card.identifier()) {
            break;
        }
        current = card.previous_card().and_then(|id| fetch(id));
        chain.push(card);
    }

    chain
}

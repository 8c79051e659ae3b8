//! The card manager: import, verify, index, and export cards.

use cardchain_core::{Card, CardCrypto, CardError, CardId, CardVerifier, RawSignedModel};
use cardchain_store::{CardStore, InsertResult, StoreError};

use crate::config::CardManagerConfig;
use crate::error::{ManagerError, Result};

/// Result of importing a card.
#[derive(Debug)]
pub enum ImportResult {
    /// Card was accepted and stored.
    Accepted(CardId),
    /// Card was already in store (idempotent).
    Duplicate(CardId),
    /// Card was refused. The input is untrusted, so this is not an error.
    Rejected(CardError),
}

impl ImportResult {
    /// The card id, unless the card was rejected.
    pub fn card_id(&self) -> Option<&CardId> {
        match self {
            ImportResult::Accepted(id) | ImportResult::Duplicate(id) => Some(id),
            ImportResult::Rejected(_) => None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, ImportResult::Accepted(_))
    }
}

/// The main manager struct.
///
/// Owns a crypto capability and a card store. Every imported card goes
/// through parse, verify, insert, in that order; the store resolves the
/// previous-card chain as part of insert.
pub struct CardManager<C: CardCrypto, S: CardStore<C::PublicKey>> {
    crypto: C,
    store: S,
    config: CardManagerConfig,
    verifier: CardVerifier<C::PublicKey>,
}

impl<C, S> CardManager<C, S>
where
    C: CardCrypto,
    S: CardStore<C::PublicKey>,
{
    /// Create a new manager.
    ///
    /// Fails if a required signer has no usable trusted key.
    pub fn new(crypto: C, store: S, config: CardManagerConfig) -> Result<Self> {
        let verifier = CardVerifier::new(&crypto, &config.verifier_policy())?;
        Ok(Self {
            crypto,
            store,
            config,
            verifier,
        })
    }

    pub fn crypto(&self) -> &C {
        &self.crypto
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &CardManagerConfig {
        &self.config
    }

    // ─── Import ───

    /// Import a card from its raw model.
    pub fn import_raw(&self, raw: &RawSignedModel) -> Result<ImportResult> {
        let card = match Card::try_parse(&self.crypto, raw) {
            Ok(card) => card,
            Err(e) => {
                tracing::warn!("Rejected card: {}", e);
                return Ok(ImportResult::Rejected(e));
            }
        };
        let id = *card.identifier();

        if let Err(e) = self.verifier.verify(&self.crypto, &card) {
            tracing::warn!(card_id = %id, "Rejected card: {}", e);
            return Ok(ImportResult::Rejected(e));
        }

        if self.config.require_known_previous {
            if let Some(reference) = card.previous_card_ref() {
                let known = match card.previous_card_id() {
                    Some(previous) => self.store.has(previous)?,
                    None => false,
                };
                if !known {
                    tracing::warn!(card_id = %id, previous = reference, "Rejected card with unknown predecessor");
                    return Ok(ImportResult::Rejected(CardError::MalformedContent(format!(
                        "previous card {} is not known",
                        reference
                    ))));
                }
            }
        }

        // A card error out of the store comes from the card itself, not the backend.
        let inserted = match self.store.insert(card) {
            Ok(inserted) => inserted,
            Err(StoreError::Card(e)) => {
                tracing::warn!(card_id = %id, "Rejected card: {}", e);
                return Ok(ImportResult::Rejected(e));
            }
            Err(e) => return Err(e.into()),
        };

        match inserted {
            InsertResult::Inserted => {
                tracing::debug!(card_id = %id, "Accepted card");
                Ok(ImportResult::Accepted(id))
            }
            InsertResult::AlreadyExists if self.config.reject_duplicates => {
                Ok(ImportResult::Duplicate(id))
            }
            InsertResult::AlreadyExists => Ok(ImportResult::Accepted(id)),
        }
    }

    /// Import many cards. Bad records are rejected individually; only
    /// storage failures abort the batch.
    pub fn import_batch<'r, I>(&self, raws: I) -> Result<Vec<ImportResult>>
    where
        I: IntoIterator<Item = &'r RawSignedModel>,
    {
        let results = raws
            .into_iter()
            .map(|raw| self.import_raw(raw))
            .collect::<Result<Vec<_>>>()?;

        let accepted = results.iter().filter(|r| r.is_accepted()).count();
        tracing::debug!(total = results.len(), accepted, "Imported batch");
        Ok(results)
    }

    /// Import a card from wire JSON.
    pub fn import_json(&self, json: &str) -> Result<ImportResult> {
        match RawSignedModel::import_from_json(json) {
            Ok(raw) => self.import_raw(&raw),
            Err(e) => Ok(ImportResult::Rejected(e)),
        }
    }

    /// Import a card from base64-wrapped wire JSON.
    pub fn import_base64(&self, encoded: &str) -> Result<ImportResult> {
        match RawSignedModel::import_from_base64_string(encoded) {
            Ok(raw) => self.import_raw(&raw),
            Err(e) => Ok(ImportResult::Rejected(e)),
        }
    }

    // ─── Export ───

    /// Rebuild the raw model of a stored card.
    pub fn export_raw(&self, id: &CardId) -> Result<RawSignedModel> {
        let card = self.store.get(id)?.ok_or(ManagerError::CardNotFound(*id))?;
        Ok(card.raw_model()?)
    }

    /// Export a stored card as base64-wrapped wire JSON.
    pub fn export_base64(&self, id: &CardId) -> Result<String> {
        Ok(self.export_raw(id)?.export_as_base64_string()?)
    }

    // ─── Queries ───

    /// Get a card by identifier.
    pub fn get(&self, id: &CardId) -> Result<Option<Card<C::PublicKey>>> {
        Ok(self.store.get(id)?)
    }

    /// Cards for an identity that no known card supersedes.
    pub fn current_cards(&self, identity: &str) -> Result<Vec<Card<C::PublicKey>>> {
        Ok(self.store.current_by_identity(identity)?)
    }

    /// Rotation history ending at `id`, newest first.
    pub fn history(&self, id: &CardId) -> Result<Vec<Card<C::PublicKey>>> {
        if !self.store.has(id)? {
            return Err(ManagerError::CardNotFound(*id));
        }
        Ok(self.store.chain(id)?)
    }
}

//! Card: the validated, content-addressed identity record.
//!
//! A card is built only by parsing a [`RawSignedModel`]. Parsing is total
//! over untrusted input: anything malformed yields `None` from
//! [`Card::parse`], and [`Card::try_parse`] reports why.
//!
//! The identifier is derived from the snapshot bytes the card arrived with.
//! Those bytes are kept verbatim, so exporting a card with
//! [`Card::raw_model`] reproduces the envelope it was parsed from.

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::canonical::decode_content;
use crate::crypto::CardCrypto;
use crate::error::{CardError, Result};
use crate::raw::RawSignedModel;
use crate::signature::CardSignature;
use crate::types::CardId;

/// An identity card.
///
/// `K` is the public key handle of the crypto capability that parsed it.
/// All fields except `previous_card` and `is_outdated` are write-once; those
/// two are only changed by the chain resolver.
#[derive(Debug, Clone)]
pub struct Card<K> {
    identifier: CardId,
    identity: String,
    public_key: K,
    version: String,
    created_at: DateTime<Utc>,
    signatures: Vec<CardSignature>,
    previous_card_ref: Option<String>,
    previous_card_id: Option<CardId>,
    previous_card: Option<CardId>,
    is_outdated: bool,
    content_snapshot: Bytes,
}

impl<K: Clone> Card<K> {
    /// Parse a raw model, returning `None` for any malformed input.
    pub fn parse<C>(crypto: &C, raw: &RawSignedModel) -> Option<Self>
    where
        C: CardCrypto<PublicKey = K>,
    {
        match Self::try_parse(crypto, raw) {
            Ok(card) => Some(card),
            Err(e) => {
                tracing::debug!(error = %e, "Discarding unparseable card");
                None
            }
        }
    }

    /// Parse a raw model, reporting the reason on failure.
    pub fn try_parse<C>(crypto: &C, raw: &RawSignedModel) -> Result<Self>
    where
        C: CardCrypto<PublicKey = K>,
    {
        let snapshot = raw.content_snapshot();
        let content = decode_content(snapshot)?;

        let key_bytes = content.public_key_bytes()?;
        let public_key = crypto
            .import_public_key(&key_bytes)
            .map_err(|e| CardError::InvalidPublicKey(e.to_string()))?;

        // Identifier is over the received bytes, never a re-encoding.
        let identifier = CardId::from_digest(&crypto.generate_sha512(snapshot));

        let previous_card_id = content.previous_id();

        let signatures = raw.signatures().iter().map(CardSignature::from_raw).collect();

        let created_at = DateTime::<Utc>::from_timestamp(content.created_at, 0).ok_or_else(|| {
            CardError::MalformedContent(format!("created_at {} out of range", content.created_at))
        })?;

        tracing::trace!(card_id = %identifier, identity = %content.identity, "Parsed card");

        Ok(Self {
            identifier,
            identity: content.identity,
            public_key,
            version: content.version,
            created_at,
            signatures,
            previous_card_ref: content.previous_card_id,
            previous_card_id,
            previous_card: None,
            is_outdated: false,
            content_snapshot: snapshot.clone(),
        })
    }
}

impl<K> Card<K> {
    /// Rebuild the wire envelope.
    ///
    /// Fails on the first signature that cannot be encoded.
    pub fn raw_model(&self) -> Result<RawSignedModel> {
        let mut raw = RawSignedModel::new(self.content_snapshot.clone());
        for signature in &self.signatures {
            raw.add_signature(signature.to_raw()?)?;
        }
        Ok(raw)
    }

    /// Rebuild the wire envelope, skipping signatures that cannot be encoded.
    ///
    /// The skipped signatures' errors are returned alongside the model.
    pub fn raw_model_partial(&self) -> (RawSignedModel, Vec<CardError>) {
        let mut raw = RawSignedModel::new(self.content_snapshot.clone());
        let mut errors = Vec::new();

        for signature in &self.signatures {
            let result = signature.to_raw().and_then(|s| raw.add_signature(s));
            if let Err(e) = result {
                tracing::warn!(card_id = %self.identifier, signer = signature.signer(), "Skipping signature: {}", e);
                errors.push(e);
            }
        }

        (raw, errors)
    }

    // ─── Accessors ───

    pub fn identifier(&self) -> &CardId {
        &self.identifier
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn public_key(&self) -> &K {
        &self.public_key
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn signatures(&self) -> &[CardSignature] {
        &self.signatures
    }

    /// The signature made by a signer id, if any.
    pub fn signature_by(&self, signer: &str) -> Option<&CardSignature> {
        self.signatures.iter().find(|s| s.signer() == signer)
    }

    /// The predecessor named in the content, resolved or not.
    ///
    /// `None` when the content names no predecessor or names it with a
    /// string that is not a card identifier.
    pub fn previous_card_id(&self) -> Option<&CardId> {
        self.previous_card_id.as_ref()
    }

    /// The `previous_card_id` string exactly as the content carries it.
    pub fn previous_card_ref(&self) -> Option<&str> {
        self.previous_card_ref.as_deref()
    }

    /// The predecessor once the chain resolver found it.
    pub fn previous_card(&self) -> Option<&CardId> {
        self.previous_card.as_ref()
    }

    /// Whether a newer known card names this one as its predecessor.
    pub fn is_outdated(&self) -> bool {
        self.is_outdated
    }

    pub fn content_snapshot(&self) -> &Bytes {
        &self.content_snapshot
    }

    // ─── Chain mutation (resolver only) ───

    pub(crate) fn link_previous(&mut self, previous: CardId) {
        self.previous_card = Some(previous);
    }

    pub(crate) fn mark_outdated(&mut self) {
        self.is_outdated = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::encode_content;
    use crate::content::CardContent;
    use crate::crypto::{Ed25519CardCrypto, Keypair};
    use crate::signature::{RawSignature, SignerType};

    fn model_for(content: &CardContent) -> RawSignedModel {
        RawSignedModel::new(encode_content(content).unwrap())
    }

    #[test]
    fn test_parse_sets_initial_chain_state() {
        let crypto = Ed25519CardCrypto;
        let key = Keypair::from_seed(&[3; 32]).public_key();
        let card = Card::parse(&crypto, &model_for(&CardContent::new("bob", key.as_bytes(), 5))).unwrap();

        assert_eq!(card.identity(), "bob");
        assert_eq!(card.public_key(), &key);
        assert!(!card.is_outdated());
        assert!(card.previous_card().is_none());
        assert!(card.previous_card_id().is_none());
    }

    #[test]
    fn test_parse_reads_previous_card_id() {
        let crypto = Ed25519CardCrypto;
        let key = Keypair::from_seed(&[3; 32]).public_key();
        let prev = CardId::from_bytes([0x77; 32]);
        let content = CardContent::new("bob", key.as_bytes(), 5).with_previous(&prev);
        let card = Card::parse(&crypto, &model_for(&content)).unwrap();

        assert_eq!(card.previous_card_id(), Some(&prev));
        assert!(card.previous_card().is_none());
    }

    #[test]
    fn test_try_parse_reports_bad_key() {
        let crypto = Ed25519CardCrypto;
        let content = CardContent::new("bob", &[1u8; 5], 5);
        let result = Card::try_parse(&crypto, &model_for(&content));
        assert!(matches!(result, Err(CardError::InvalidPublicKey(_))));
    }

    #[test]
    fn test_parse_keeps_foreign_previous_reference() {
        let crypto = Ed25519CardCrypto;
        let key = Keypair::from_seed(&[3; 32]).public_key();
        let mut content = CardContent::new("bob", key.as_bytes(), 5);
        content.previous_card_id = Some("legacy-card-7".into());
        let raw = model_for(&content);

        let card = Card::try_parse(&crypto, &raw).unwrap();
        assert_eq!(card.previous_card_ref(), Some("legacy-card-7"));
        assert!(card.previous_card_id().is_none());
        assert!(card.previous_card().is_none());
        assert_eq!(card.raw_model().unwrap(), raw);
    }

    #[test]
    fn test_raw_model_partial_skips_bad_signature() {
        let crypto = Ed25519CardCrypto;
        let key = Keypair::from_seed(&[3; 32]).public_key();
        let mut raw = model_for(&CardContent::new("bob", key.as_bytes(), 5));
        raw.add_signature(RawSignature::new("self", vec![1u8; 64], None)).unwrap();
        raw.add_signature(RawSignature::new("virgil", vec![2u8; 64], None)).unwrap();

        let mut card = Card::parse(&crypto, &raw).unwrap();
        card.signatures[1] = card.signatures[1].clone().with_signer_type(SignerType::SelfSigned);
        assert!(matches!(card.raw_model(), Err(CardError::SignatureEncoding { .. })));

        let (partial, errors) = card.raw_model_partial();
        assert_eq!(errors.len(), 1);
        assert_eq!(partial.signatures().len(), 1);
        assert_eq!(partial.signatures()[0].signer, "self");
    }

    #[test]
    fn test_empty_cosignature_roundtrips() {
        let crypto = Ed25519CardCrypto;
        let key = Keypair::from_seed(&[3; 32]).public_key();
        let mut raw = model_for(&CardContent::new("bob", key.as_bytes(), 5));
        raw.add_signature(RawSignature::new("self", vec![1u8; 64], None)).unwrap();
        raw.add_signature(RawSignature::new("acme", Vec::<u8>::new(), None)).unwrap();
        raw.add_signature(RawSignature::new("", vec![3u8; 64], None)).unwrap();

        let card = Card::parse(&crypto, &raw).unwrap();
        assert_eq!(card.raw_model().unwrap(), raw);
        assert!(card.raw_model_partial().1.is_empty());
    }

    #[test]
    fn test_signature_by() {
        let crypto = Ed25519CardCrypto;
        let key = Keypair::from_seed(&[3; 32]).public_key();
        let mut raw = model_for(&CardContent::new("bob", key.as_bytes(), 5));
        raw.add_signature(RawSignature::new("virgil", vec![2u8; 64], None)).unwrap();

        let card = Card::parse(&crypto, &raw).unwrap();
        assert!(card.signature_by("virgil").is_some());
        assert!(card.signature_by("self").is_none());
    }
}

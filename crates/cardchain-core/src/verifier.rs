//! Card verification against a signer policy.

use std::collections::HashMap;

use crate::card::Card;
use crate::crypto::CardCrypto;
use crate::error::{CardError, Result};
use crate::signature::SignerType;
use crate::signer::signed_message;

/// Which signatures a card must carry.
#[derive(Debug, Clone)]
pub struct VerifierPolicy {
    /// Require a valid self signature made with the card's own key.
    pub verify_self_signature: bool,

    /// Signer ids that must be present and valid.
    pub required_signers: Vec<String>,

    /// Raw public keys for non-self signers, keyed by signer id.
    pub trusted_keys: HashMap<String, Vec<u8>>,
}

impl Default for VerifierPolicy {
    fn default() -> Self {
        Self {
            verify_self_signature: true,
            required_signers: Vec::new(),
            trusted_keys: HashMap::new(),
        }
    }
}

/// A policy with its trusted keys already imported.
///
/// Build once and reuse; keys are imported only in [`CardVerifier::new`].
#[derive(Debug, Clone)]
pub struct CardVerifier<K> {
    verify_self_signature: bool,
    required: Vec<(String, K)>,
}

impl<K> CardVerifier<K> {
    /// Import the trusted keys for every required signer.
    ///
    /// Fails with `UntrustedSigner` when a required signer has no key.
    pub fn new<C>(crypto: &C, policy: &VerifierPolicy) -> Result<Self>
    where
        C: CardCrypto<PublicKey = K>,
    {
        let mut required = Vec::with_capacity(policy.required_signers.len());

        for signer in &policy.required_signers {
            let bytes = policy
                .trusted_keys
                .get(signer)
                .ok_or_else(|| CardError::UntrustedSigner(signer.clone()))?;
            let key = crypto.import_public_key(bytes)?;
            required.push((signer.clone(), key));
        }

        Ok(Self {
            verify_self_signature: policy.verify_self_signature,
            required,
        })
    }

    /// Check a card against the policy.
    pub fn verify<C>(&self, crypto: &C, card: &Card<K>) -> Result<()>
    where
        C: CardCrypto<PublicKey = K>,
    {
        if self.verify_self_signature {
            check(crypto, card, SignerType::SELF, card.public_key())?;
        }
        for (signer, key) in &self.required {
            check(crypto, card, signer, key)?;
        }
        Ok(())
    }
}

fn check<C: CardCrypto>(
    crypto: &C,
    card: &Card<C::PublicKey>,
    signer: &str,
    key: &C::PublicKey,
) -> Result<()> {
    let signature = card
        .signature_by(signer)
        .ok_or_else(|| CardError::MissingSignature(signer.to_string()))?;

    let message = signed_message(card.content_snapshot(), signature.snapshot().map(|s| &s[..]));
    if !crypto.verify_signature(signature.signature(), &message, key) {
        tracing::debug!(card_id = %card.identifier(), signer, "Signature check failed");
        return Err(CardError::InvalidSignature(signer.to_string()));
    }
    Ok(())
}

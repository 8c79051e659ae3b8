//! Card manager configuration.

use std::collections::HashMap;

use cardchain_core::VerifierPolicy;

/// Configuration for a [`CardManager`](crate::CardManager).
#[derive(Debug, Clone)]
pub struct CardManagerConfig {
    /// Require a valid self signature on every imported card.
    pub verify_self_signature: bool,
    /// Signer ids whose valid signature every imported card must carry.
    pub required_signers: Vec<String>,
    /// Raw public keys of non-self signers, keyed by signer id.
    pub trusted_keys: HashMap<String, Vec<u8>>,
    /// Reject cards whose predecessor is not already known.
    pub require_known_previous: bool,
    /// Report re-imports of a known card as `Duplicate` rather than `Accepted`.
    pub reject_duplicates: bool,
}

impl Default for CardManagerConfig {
    fn default() -> Self {
        Self {
            verify_self_signature: true,
            required_signers: Vec::new(),
            trusted_keys: HashMap::new(),
            require_known_previous: false,
            reject_duplicates: true,
        }
    }
}

impl CardManagerConfig {
    /// Require a signature from `signer`, verified with `public_key`.
    pub fn require_signer(mut self, signer: impl Into<String>, public_key: impl Into<Vec<u8>>) -> Self {
        let signer = signer.into();
        self.trusted_keys.insert(signer.clone(), public_key.into());
        if !self.required_signers.contains(&signer) {
            self.required_signers.push(signer);
        }
        self
    }

    /// The verification part of this configuration.
    pub fn verifier_policy(&self) -> VerifierPolicy {
        VerifierPolicy {
            verify_self_signature: self.verify_self_signature,
            required_signers: self.required_signers.clone(),
            trusted_keys: self.trusted_keys.clone(),
        }
    }
}

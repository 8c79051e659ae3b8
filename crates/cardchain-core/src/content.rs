//! CardContent: the payload a content snapshot encodes.
//!
//! Field names and order match the wire protocol. The snapshot bytes a card
//! was parsed from are retained separately; this struct is only the decoded
//! view of them.

use serde::{Deserialize, Serialize};

use crate::canonical::{decode_base64, encode_base64};
use crate::error::{CardError, Result};
use crate::types::CardId;

/// The card format version written by this crate.
pub const CARD_VERSION: &str = "5.0";

/// The identity + public key + metadata tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardContent {
    /// The identity this card binds (non-empty).
    pub identity: String,

    /// Base64 of the raw public key bytes.
    #[serde(rename = "public_key")]
    pub public_key_base64: String,

    /// Format version, `"N.N"`.
    pub version: String,

    /// Creation time, Unix seconds.
    pub created_at: i64,

    /// Identifier of the card this one replaces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_card_id: Option<String>,
}

impl CardContent {
    /// Content for a new card at the current format version.
    pub fn new(identity: impl Into<String>, public_key: &[u8], created_at: i64) -> Self {
        Self {
            identity: identity.into(),
            public_key_base64: encode_base64(public_key),
            version: CARD_VERSION.to_string(),
            created_at,
            previous_card_id: None,
        }
    }

    /// Name the card this content supersedes.
    pub fn with_previous(mut self, previous: &CardId) -> Self {
        self.previous_card_id = Some(previous.to_hex());
        self
    }

    /// Decode the public key field.
    pub fn public_key_bytes(&self) -> Result<Vec<u8>> {
        decode_base64(&self.public_key_base64)
            .map_err(|e| CardError::InvalidPublicKey(format!("public_key is not base64: {}", e)))
    }

    /// The previous card id, when the reference is a card identifier.
    ///
    /// Any other string is kept in `previous_card_id` but can never name a
    /// known card.
    pub fn previous_id(&self) -> Option<CardId> {
        self.previous_card_id
            .as_deref()
            .and_then(|s| CardId::from_hex(s).ok())
    }
}

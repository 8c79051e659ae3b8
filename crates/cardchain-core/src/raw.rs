//! RawSignedModel: the wire envelope exchanged with card registries.
//!
//! ```json
//! {
//!   "content_snapshot": "<base64>",
//!   "signatures": [{ "signer": "self", "signature": "<base64>", "snapshot": "<base64>" }]
//! }
//! ```
//!
//! The content snapshot is set once at construction. Signatures can only be
//! appended, and at most one signature per signer id is accepted.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::canonical::{decode_base64, encode_base64};
use crate::error::{CardError, Result};
use crate::signature::RawSignature;

/// A content snapshot plus its ordered signature list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireModel")]
pub struct RawSignedModel {
    #[serde(with = "crate::canonical::base64_bytes")]
    content_snapshot: Bytes,
    signatures: Vec<RawSignature>,
}

/// Unchecked wire shape; converted through `add_signature` on decode.
#[derive(Deserialize)]
struct WireModel {
    #[serde(with = "crate::canonical::base64_bytes")]
    content_snapshot: Bytes,
    #[serde(default)]
    signatures: Vec<RawSignature>,
}

impl TryFrom<WireModel> for RawSignedModel {
    type Error = CardError;

    fn try_from(wire: WireModel) -> Result<Self> {
        let mut model = RawSignedModel::new(wire.content_snapshot);
        for signature in wire.signatures {
            model.add_signature(signature)?;
        }
        Ok(model)
    }
}

impl RawSignedModel {
    /// Create an unsigned model around a content snapshot.
    pub fn new(content_snapshot: impl Into<Bytes>) -> Self {
        Self {
            content_snapshot: content_snapshot.into(),
            signatures: Vec::new(),
        }
    }

    /// The snapshot bytes exactly as received or created.
    pub fn content_snapshot(&self) -> &Bytes {
        &self.content_snapshot
    }

    /// Signatures in insertion order.
    pub fn signatures(&self) -> &[RawSignature] {
        &self.signatures
    }

    /// Append a signature.
    ///
    /// Fails with `DuplicateSigner` if the signer already signed; the list is
    /// left unchanged in that case.
    pub fn add_signature(&mut self, signature: RawSignature) -> Result<()> {
        if self.signature_by(&signature.signer).is_some() {
            return Err(CardError::DuplicateSigner(signature.signer));
        }
        self.signatures.push(signature);
        Ok(())
    }

    /// Look up the signature made by a signer id.
    pub fn signature_by(&self, signer: &str) -> Option<&RawSignature> {
        self.signatures.iter().find(|s| s.signer == signer)
    }

    // ─── Import / Export ───

    /// Serialize to wire JSON.
    pub fn export_as_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse wire JSON.
    pub fn import_from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize as base64 of the wire JSON.
    pub fn export_as_base64_string(&self) -> Result<String> {
        Ok(encode_base64(self.export_as_json()?.as_bytes()))
    }

    /// Parse base64-wrapped wire JSON.
    pub fn import_from_base64_string(s: &str) -> Result<Self> {
        let bytes = decode_base64(s.trim())
            .map_err(|e| CardError::Serialization(format!("invalid base64: {}", e)))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

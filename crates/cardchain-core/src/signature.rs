//! Signature envelopes: the wire form ([`RawSignature`]) and the parsed
//! domain form ([`CardSignature`]).

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::canonical::decode_extra_fields;
use crate::error::{CardError, Result};

/// Auxiliary signed metadata carried in a signature snapshot.
pub type ExtraFields = BTreeMap<String, String>;

/// Who produced a signature.
///
/// Derived from the wire `signer` string, which is the signer id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SignerType {
    /// The card owner, signing with the card's own key.
    SelfSigned,
    /// The issuing card service.
    VirgilService,
    /// Any other verifier, identified by its signer id.
    Custom(String),
}

impl SignerType {
    /// Signer id used for self signatures.
    pub const SELF: &'static str = "self";

    /// Signer id used by the card service.
    pub const VIRGIL: &'static str = "virgil";

    /// Classify a signer id.
    pub fn from_signer(signer: &str) -> Self {
        match signer {
            Self::SELF => Self::SelfSigned,
            Self::VIRGIL => Self::VirgilService,
            other => Self::Custom(other.to_string()),
        }
    }

    /// The signer id this type corresponds to.
    pub fn as_str(&self) -> &str {
        match self {
            Self::SelfSigned => Self::SELF,
            Self::VirgilService => Self::VIRGIL,
            Self::Custom(s) => s,
        }
    }
}

impl fmt::Display for SignerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One signature as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSignature {
    /// Signer id (`"self"`, `"virgil"`, or a custom verifier id).
    pub signer: String,

    /// Raw signature bytes.
    #[serde(with = "crate::canonical::base64_bytes")]
    pub signature: Bytes,

    /// Extra signed data, usually a flat JSON object.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::canonical::base64_bytes_opt"
    )]
    pub snapshot: Option<Bytes>,
}

impl RawSignature {
    /// Create a signature envelope.
    pub fn new(
        signer: impl Into<String>,
        signature: impl Into<Bytes>,
        snapshot: Option<Bytes>,
    ) -> Self {
        Self {
            signer: signer.into(),
            signature: signature.into(),
            snapshot,
        }
    }

    /// The role of the signer.
    pub fn signer_type(&self) -> SignerType {
        SignerType::from_signer(&self.signer)
    }
}

/// A signature attached to a parsed [`Card`](crate::card::Card).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSignature {
    signer: String,
    signer_type: SignerType,
    signature: Bytes,
    snapshot: Option<Bytes>,
    extra_fields: Option<ExtraFields>,
}

impl CardSignature {
    /// Convert a wire signature. Never fails: an undecodable snapshot only
    /// leaves `extra_fields` empty.
    pub fn from_raw(raw: &RawSignature) -> Self {
        let extra_fields = raw.snapshot.as_deref().and_then(decode_extra_fields);

        Self {
            signer: raw.signer.clone(),
            signer_type: raw.signer_type(),
            signature: raw.signature.clone(),
            snapshot: raw.snapshot.clone(),
            extra_fields,
        }
    }

    /// Convert back to the wire form, reusing the stored bytes unchanged.
    ///
    /// Empty signer ids and empty signatures are valid wire values and are
    /// passed through. Only a signer type that disagrees with the signer id
    /// cannot be encoded.
    pub fn to_raw(&self) -> Result<RawSignature> {
        if self.signer_type.as_str() != self.signer {
            return Err(CardError::SignatureEncoding {
                signer: self.signer.clone(),
                reason: format!("signer type {} does not match signer id", self.signer_type),
            });
        }

        Ok(RawSignature {
            signer: self.signer.clone(),
            signature: self.signature.clone(),
            snapshot: self.snapshot.clone(),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_signer_type(mut self, signer_type: SignerType) -> Self {
        self.signer_type = signer_type;
        self
    }

    /// Signer id.
    pub fn signer(&self) -> &str {
        &self.signer
    }

    pub fn signer_type(&self) -> &SignerType {
        &self.signer_type
    }

    /// Raw signature bytes.
    pub fn signature(&self) -> &Bytes {
        &self.signature
    }

    /// Extra signed data, kept verbatim.
    pub fn snapshot(&self) -> Option<&Bytes> {
        self.snapshot.as_ref()
    }

    /// The snapshot decoded as a flat string map, when it is one.
    pub fn extra_fields(&self) -> Option<&ExtraFields> {
        self.extra_fields.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signer_type_classification() {
        assert_eq!(SignerType::from_signer("self"), SignerType::SelfSigned);
        assert_eq!(SignerType::from_signer("virgil"), SignerType::VirgilService);
        assert_eq!(
            SignerType::from_signer("acme-verifier"),
            SignerType::Custom("acme-verifier".into())
        );
        assert_eq!(SignerType::Custom("x".into()).as_str(), "x");
    }

    #[test]
    fn test_raw_signature_wire_shape() {
        let sig = RawSignature::new("self", vec![1u8, 2, 3], None);
        let json = serde_json::to_string(&sig).unwrap();
        assert_eq!(json, r#"{"signer":"self","signature":"AQID"}"#);

        let with_snapshot = RawSignature::new("self", vec![1u8, 2, 3], Some(Bytes::from_static(b"{}")));
        let json = serde_json::to_string(&with_snapshot).unwrap();
        assert_eq!(json, r#"{"signer":"self","signature":"AQID","snapshot":"e30="}"#);
    }

    #[test]
    fn test_raw_signature_rejects_bad_base64() {
        let result: std::result::Result<RawSignature, _> =
            serde_json::from_str(r#"{"signer":"self","signature":"@@@"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_card_signature_decodes_extra_fields() {
        let raw = RawSignature::new(
            "self",
            vec![9u8; 64],
            Some(Bytes::from_static(br#"{"device":"phone"}"#)),
        );
        let sig = CardSignature::from_raw(&raw);
        assert_eq!(sig.signer_type(), &SignerType::SelfSigned);
        let fields = sig.extra_fields().unwrap();
        assert_eq!(fields.get("device").map(String::as_str), Some("phone"));
    }

    #[test]
    fn test_card_signature_keeps_undecodable_snapshot() {
        let raw = RawSignature::new("self", vec![9u8; 64], Some(Bytes::from_static(b"[1,2]")));
        let sig = CardSignature::from_raw(&raw);
        assert!(sig.extra_fields().is_none());
        assert_eq!(sig.snapshot().map(|s| &s[..]), Some(&b"[1,2]"[..]));
        assert_eq!(sig.to_raw().unwrap(), raw);
    }

    #[test]
    fn test_to_raw_passes_empty_values_through() {
        let empty_signature = RawSignature::new("acme", Vec::<u8>::new(), None);
        assert_eq!(CardSignature::from_raw(&empty_signature).to_raw().unwrap(), empty_signature);

        let empty_signer = RawSignature::new("", vec![4u8; 8], None);
        let sig = CardSignature::from_raw(&empty_signer);
        assert_eq!(sig.signer_type(), &SignerType::Custom(String::new()));
        assert_eq!(sig.to_raw().unwrap(), empty_signer);
    }

    #[test]
    fn test_to_raw_rejects_mismatched_type() {
        let mut sig = CardSignature::from_raw(&RawSignature::new("self", vec![1u8], None));
        sig.signer_type = SignerType::VirgilService;
        assert!(matches!(
            sig.to_raw(),
            Err(CardError::SignatureEncoding { .. })
        ));
    }
}

//! Canonical encoding of card content and signature metadata.
//!
//! Content snapshots are compact UTF-8 JSON with fields in wire order:
//! `identity`, `public_key`, `version`, `created_at`, then `previous_card_id`
//! when present. All byte fields on the wire are standard padded base64.
//!
//! A card's identifier is computed over the snapshot bytes it was received
//! with, not over a re-encoding. Encoding here is only used when a new
//! snapshot is created.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::content::CardContent;
use crate::error::{CardError, Result};
use crate::signature::ExtraFields;

/// Encode card content to snapshot bytes.
pub fn encode_content(content: &CardContent) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(content)?)
}

/// Decode snapshot bytes into card content.
///
/// Fails with `MalformedContent` when the bytes are not a JSON object, a
/// required field is missing or mistyped, the identity is empty, or the
/// public key is not valid base64.
pub fn decode_content(snapshot: &[u8]) -> Result<CardContent> {
    let value: serde_json::Value = serde_json::from_slice(snapshot)
        .map_err(|e| CardError::MalformedContent(e.to_string()))?;

    if !value.is_object() {
        return Err(CardError::MalformedContent("expected a JSON object".into()));
    }

    let content: CardContent = serde_json::from_value(value)
        .map_err(|e| CardError::MalformedContent(e.to_string()))?;

    if content.identity.is_empty() {
        return Err(CardError::MalformedContent("identity is empty".into()));
    }

    if decode_base64(&content.public_key_base64).is_err() {
        return Err(CardError::MalformedContent("public_key is not base64".into()));
    }

    Ok(content)
}

/// Encode a flat string map as a signature snapshot.
pub fn encode_extra_fields(fields: &ExtraFields) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(fields)?)
}

/// Interpret a signature snapshot as a flat string-to-string map.
///
/// Anything else (invalid JSON, nested values, non-string values) yields
/// `None`; that is not an error for the signature carrying it.
pub fn decode_extra_fields(snapshot: &[u8]) -> Option<ExtraFields> {
    serde_json::from_slice(snapshot).ok()
}

/// Standard padded base64.
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard padded base64.
pub fn decode_base64(s: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(s)
}

/// Serde adapter: `Bytes` as a base64 string.
pub(crate) mod base64_bytes {
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode_base64(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::decode_base64(&s)
            .map(Bytes::from)
            .map_err(serde::de::Error::custom)
    }
}

/// Serde adapter: `Option<Bytes>` as an optional base64 string.
pub(crate) mod base64_bytes_opt {
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        bytes: &Option<Bytes>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(b) => serializer.serialize_some(&super::encode_base64(b)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Bytes>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|s| {
                super::decode_base64(&s)
                    .map(Bytes::from)
                    .map_err(serde::de::Error::custom)
            })
            .transpose()
    }
}

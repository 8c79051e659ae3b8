//! Error types for Cardchain Core.

use thiserror::Error;

/// Errors that can occur while building, parsing, or exporting cards.
#[derive(Debug, Error)]
pub enum CardError {
    #[error("malformed card content: {0}")]
    MalformedContent(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("signer {0} already signed this model")]
    DuplicateSigner(String),

    #[error("signature from {signer} cannot be encoded: {reason}")]
    SignatureEncoding { signer: String, reason: String },

    #[error("missing signature from {0}")]
    MissingSignature(String),

    #[error("invalid signature from {0}")]
    InvalidSignature(String),

    #[error("no trusted key for signer {0}")]
    UntrustedSigner(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

impl From<serde_json::Error> for CardError {
    fn from(e: serde_json::Error) -> Self {
        CardError::Serialization(e.to_string())
    }
}

/// Errors reported by a [`CardCrypto`](crate::crypto::CardCrypto) capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("cannot import public key: {0}")]
    KeyImport(String),

    #[error("signing failed: {0}")]
    Signing(String),
}

/// Result type for card operations.
pub type Result<T> = std::result::Result<T, CardError>;

//! Card creation flow: signing raw models.
//!
//! A signature covers `content_snapshot || extra_snapshot`, where the extra
//! snapshot is the optional flat JSON map carried in the signature itself.

use bytes::Bytes;

use crate::canonical::{encode_content, encode_extra_fields};
use crate::content::CardContent;
use crate::crypto::CardCrypto;
use crate::error::{CardError, Result};
use crate::raw::RawSignedModel;
use crate::signature::{ExtraFields, RawSignature, SignerType};

/// The bytes a signature is computed over.
pub fn signed_message(content_snapshot: &[u8], extra_snapshot: Option<&[u8]>) -> Vec<u8> {
    let extra = extra_snapshot.unwrap_or_default();
    let mut message = Vec::with_capacity(content_snapshot.len() + extra.len());
    message.extend_from_slice(content_snapshot);
    message.extend_from_slice(extra);
    message
}

/// Signs raw models with a crypto capability.
pub struct ModelSigner<'a, C: CardCrypto> {
    crypto: &'a C,
}

impl<'a, C: CardCrypto> ModelSigner<'a, C> {
    pub fn new(crypto: &'a C) -> Self {
        Self { crypto }
    }

    /// Add a signature from `signer`.
    ///
    /// Fails with `DuplicateSigner` before signing if `signer` already signed.
    pub fn sign(
        &self,
        raw: &mut RawSignedModel,
        signer: &str,
        private_key: &C::PrivateKey,
        extra_fields: Option<&ExtraFields>,
    ) -> Result<()> {
        if raw.signature_by(signer).is_some() {
            return Err(CardError::DuplicateSigner(signer.to_string()));
        }

        let extra_snapshot = extra_fields
            .map(encode_extra_fields)
            .transpose()?
            .map(Bytes::from);

        let message = signed_message(raw.content_snapshot(), extra_snapshot.as_deref());
        let signature = self.crypto.generate_signature(&message, private_key)?;

        raw.add_signature(RawSignature::new(signer, signature, extra_snapshot))
    }

    /// Add the owner's self signature.
    pub fn self_sign(
        &self,
        raw: &mut RawSignedModel,
        private_key: &C::PrivateKey,
        extra_fields: Option<&ExtraFields>,
    ) -> Result<()> {
        self.sign(raw, SignerType::SELF, private_key, extra_fields)
    }

    /// Encode content into a new model and self-sign it.
    pub fn generate(
        &self,
        content: &CardContent,
        private_key: &C::PrivateKey,
        extra_fields: Option<&ExtraFields>,
    ) -> Result<RawSignedModel> {
        let mut raw = RawSignedModel::new(encode_content(content)?);
        self.self_sign(&mut raw, private_key, extra_fields)?;
        Ok(raw)
    }
}

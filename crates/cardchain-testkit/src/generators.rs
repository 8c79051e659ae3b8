//! Proptest generators for property-based testing.

use bytes::Bytes;
use proptest::prelude::*;

use cardchain_core::{
    CardContent, CardId, Ed25519CardCrypto, Ed25519PublicKey, ExtraFields, Keypair, ModelSigner,
    RawSignature, RawSignedModel,
};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random Ed25519PublicKey.
pub fn public_key() -> impl Strategy<Value = Ed25519PublicKey> {
    keypair().prop_map(|kp| kp.public_key())
}

/// Generate a random CardId.
pub fn card_id() -> impl Strategy<Value = CardId> {
    any::<[u8; 32]>().prop_map(CardId::from_bytes)
}

/// Generate a non-empty identity string.
pub fn identity() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9._@-]{0,31}".prop_map(String::from)
}

/// Generate a creation time in Unix seconds.
pub fn created_at() -> impl Strategy<Value = i64> {
    0i64..=4_102_444_800 // through 2100-01-01
}

/// Generate a custom signer id (never `self`).
pub fn signer_id() -> impl Strategy<Value = String> {
    "[a-z]{3,12}".prop_filter("self is reserved", |s| s != "self")
}

/// Generate signature extra fields.
pub fn extra_fields() -> impl Strategy<Value = ExtraFields> {
    prop::collection::btree_map("[a-z_]{1,12}", "[ -~]{0,24}", 0..4)
}

/// Generate arbitrary bytes, usually not a valid snapshot.
pub fn junk_bytes(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Parameters for generating a signed raw model.
#[derive(Debug, Clone)]
pub struct CardParams {
    pub keypair: Keypair,
    pub identity: String,
    pub created_at: i64,
    pub previous_card_id: Option<CardId>,
    pub self_extra: Option<ExtraFields>,
    /// Additional signers with their signature snapshots, in order.
    pub cosigners: Vec<(String, Option<Vec<u8>>)>,
}

impl Arbitrary for CardParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            any::<[u8; 32]>(),
            identity(),
            created_at(),
            proptest::option::of(card_id()),
            proptest::option::of(extra_fields()),
            prop::collection::btree_map(signer_id(), proptest::option::of(junk_bytes(32)), 0..3),
        )
            .prop_map(|(seed, identity, created_at, previous, self_extra, cosigners)| CardParams {
                keypair: Keypair::from_seed(&seed),
                identity,
                created_at,
                previous_card_id: previous,
                self_extra,
                cosigners: cosigners.into_iter().collect(),
            })
            .boxed()
    }
}

/// Build a raw model from parameters.
///
/// The self signature is real. Cosigner signatures are fixed filler bytes and
/// their snapshots are taken as given, valid JSON or not.
pub fn raw_from_params(params: &CardParams) -> RawSignedModel {
    let mut content = CardContent::new(
        params.identity.clone(),
        params.keypair.public_key().as_bytes(),
        params.created_at,
    );
    if let Some(previous) = &params.previous_card_id {
        content = content.with_previous(previous);
    }

    let mut raw = ModelSigner::new(&Ed25519CardCrypto)
        .generate(&content, &params.keypair, params.self_extra.as_ref())
        .expect("generated content encodes");

    for (signer, snapshot) in &params.cosigners {
        let signature = RawSignature::new(
            signer.clone(),
            vec![0xa5; 64],
            snapshot.clone().map(Bytes::from),
        );
        raw.add_signature(signature).expect("cosigners are distinct");
    }

    raw
}

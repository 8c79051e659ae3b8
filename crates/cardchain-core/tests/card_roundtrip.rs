//! Parse / export behaviour of cards over real Ed25519 keys.

use bytes::Bytes;
use cardchain_core::{
    encode_content, resolve_previous, Card, CardContent, CardError, CardId, Ed25519CardCrypto,
    Ed25519PublicKey, Keypair, ModelSigner, RawSignature, RawSignedModel, SignerType,
};
use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use std::collections::HashMap;

const ALICE_SNAPSHOT: &str = r#"{"identity":"alice","public_key":"IVL40Zt5HSRFMkLhXy6rbLfP+ntqXtMAl5YOBpiB2xI=","version":"5.0","created_at":1600000000}"#;
const ALICE_ID: &str = "ceff1385639db7937f944ae2798e004646eba411b8454d97104abbec1bf61b59";

fn parse(raw: &RawSignedModel) -> Option<Card<Ed25519PublicKey>> {
    Card::parse(&Ed25519CardCrypto, raw)
}

fn signed_card(seed: u8, identity: &str, previous: Option<&CardId>) -> RawSignedModel {
    let keypair = Keypair::from_seed(&[seed; 32]);
    let mut content = CardContent::new(identity, keypair.public_key().as_bytes(), 1_600_000_000);
    if let Some(p) = previous {
        content = content.with_previous(p);
    }
    ModelSigner::new(&Ed25519CardCrypto)
        .generate(&content, &keypair, None)
        .unwrap()
}

#[test]
fn test_known_snapshot_parses() {
    let raw = RawSignedModel::new(ALICE_SNAPSHOT.as_bytes().to_vec());
    let card = parse(&raw).unwrap();

    assert_eq!(card.identity(), "alice");
    assert_eq!(card.version(), "5.0");
    assert_eq!(
        card.created_at(),
        Utc.with_ymd_and_hms(2020, 9, 13, 12, 26, 40).unwrap()
    );
    assert!(card.previous_card_id().is_none());
    assert!(!card.is_outdated());
    assert_eq!(card.public_key(), &Keypair::from_seed(&[0x42; 32]).public_key());
}

#[test]
fn test_known_snapshot_identifier() {
    let raw = RawSignedModel::new(ALICE_SNAPSHOT.as_bytes().to_vec());
    let card = parse(&raw).unwrap();
    assert_eq!(card.identifier().to_hex(), ALICE_ID);
}

#[test]
fn test_identifier_uses_received_bytes() {
    // Same content, different whitespace: different snapshot, different id.
    let spaced = r#"{"identity": "alice", "public_key": "IVL40Zt5HSRFMkLhXy6rbLfP+ntqXtMAl5YOBpiB2xI=", "version": "5.0", "created_at": 1600000000}"#;
    let a = parse(&RawSignedModel::new(ALICE_SNAPSHOT.as_bytes().to_vec())).unwrap();
    let b = parse(&RawSignedModel::new(spaced.as_bytes().to_vec())).unwrap();

    assert_eq!(a.identity(), b.identity());
    assert_ne!(a.identifier(), b.identifier());
    assert_eq!(b.content_snapshot().as_ref(), spaced.as_bytes());
}

#[test]
fn test_wire_roundtrip() {
    let mut raw = signed_card(0x42, "alice", None);
    let service = Keypair::from_seed(&[0x07; 32]);
    let mut extra = cardchain_core::ExtraFields::new();
    extra.insert("issued_by".into(), "registry".into());
    ModelSigner::new(&Ed25519CardCrypto)
        .sign(&mut raw, SignerType::VIRGIL, &service, Some(&extra))
        .unwrap();

    let json = raw.export_as_json().unwrap();
    let imported = RawSignedModel::import_from_json(&json).unwrap();
    let card = parse(&imported).unwrap();

    assert_eq!(card.signatures().len(), 2);
    assert_eq!(card.signatures()[1].signer_type(), &SignerType::VirgilService);
    assert_eq!(
        card.signatures()[1]
            .extra_fields()
            .and_then(|f| f.get("issued_by"))
            .map(String::as_str),
        Some("registry")
    );

    let exported = card.raw_model().unwrap();
    assert_eq!(exported, raw);
    assert_eq!(exported.export_as_json().unwrap(), json);
}

#[test]
fn test_undecodable_signature_snapshot_survives_roundtrip() {
    let mut raw = RawSignedModel::new(ALICE_SNAPSHOT.as_bytes().to_vec());
    raw.add_signature(RawSignature::new(
        "self",
        vec![0x11; 64],
        Some(Bytes::from_static(b"\xff\xfe not json")),
    ))
    .unwrap();

    let card = parse(&raw).unwrap();
    assert!(card.signatures()[0].extra_fields().is_none());
    assert_eq!(card.raw_model().unwrap(), raw);
}

#[test]
fn test_malformed_snapshot_is_none() {
    let raw = RawSignedModel::new(b"this is not json".to_vec());
    assert!(parse(&raw).is_none());
    assert!(matches!(
        Card::<Ed25519PublicKey>::try_parse(&Ed25519CardCrypto, &raw),
        Err(CardError::MalformedContent(_))
    ));
}

#[test]
fn test_bad_base64_public_key_is_none() {
    let snapshot = br#"{"identity":"alice","public_key":"***","version":"5.0","created_at":1600000000}"#;
    assert!(parse(&RawSignedModel::new(snapshot.to_vec())).is_none());
}

#[test]
fn test_unimportable_public_key_is_none() {
    let snapshot = br#"{"identity":"alice","public_key":"AAAA","version":"5.0","created_at":1600000000}"#;
    assert!(parse(&RawSignedModel::new(snapshot.to_vec())).is_none());
}

#[test]
fn test_duplicate_signer_rejected() {
    let mut raw = signed_card(0x42, "alice", None);
    let before = raw.clone();
    let result = raw.add_signature(RawSignature::new("self", vec![0x22; 64], None));

    assert!(matches!(result, Err(CardError::DuplicateSigner(_))));
    assert_eq!(raw, before);
}

#[test]
fn test_chain_resolution() {
    let a = parse(&signed_card(0x01, "alice", None)).unwrap();
    let a_id = *a.identifier();
    let mut b = parse(&signed_card(0x02, "alice", Some(&a_id))).unwrap();

    let mut empty: HashMap<CardId, Card<Ed25519PublicKey>> = HashMap::new();
    resolve_previous(&mut b, &mut empty);
    assert!(b.previous_card().is_none());

    let mut known = HashMap::from([(a_id, a)]);
    resolve_previous(&mut b, &mut known);
    assert_eq!(b.previous_card(), Some(&a_id));
    assert!(known[&a_id].is_outdated());

    let before = (b.previous_card().copied(), known[&a_id].is_outdated());
    resolve_previous(&mut b, &mut known);
    assert_eq!(before, (b.previous_card().copied(), known[&a_id].is_outdated()));
}

proptest! {
    #[test]
    fn prop_identifier_is_64_lowercase_hex(identity in "[a-z]{1,16}", created_at in 0i64..4_000_000_000, seed in any::<[u8; 32]>()) {
        let keypair = Keypair::from_seed(&seed);
        let content = CardContent::new(identity, keypair.public_key().as_bytes(), created_at);
        let raw = RawSignedModel::new(encode_content(&content).unwrap());
        let card = parse(&raw).unwrap();

        let hex = card.identifier().to_string();
        prop_assert_eq!(hex.len(), 64);
        prop_assert!(hex.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn prop_identifier_tracks_snapshot(identity_a in "[a-z]{1,8}", identity_b in "[a-z]{1,8}") {
        let key = Keypair::from_seed(&[0x42; 32]).public_key();
        let snap_a = encode_content(&CardContent::new(identity_a, key.as_bytes(), 1)).unwrap();
        let snap_b = encode_content(&CardContent::new(identity_b, key.as_bytes(), 1)).unwrap();

        let a = parse(&RawSignedModel::new(snap_a.clone())).unwrap();
        let b = parse(&RawSignedModel::new(snap_b.clone())).unwrap();
        prop_assert_eq!(a.identifier() == b.identifier(), snap_a == snap_b);
    }

    #[test]
    fn prop_parse_then_export_is_identity(identity in "[a-zA-Z0-9@.]{1,24}", seed in any::<[u8; 32]>(), signers in prop::collection::btree_set("[a-z]{3,10}", 0..4)) {
        let keypair = Keypair::from_seed(&seed);
        let content = CardContent::new(identity, keypair.public_key().as_bytes(), 1_600_000_000);
        let signer = ModelSigner::new(&Ed25519CardCrypto);
        let mut raw = signer.generate(&content, &keypair, None).unwrap();
        for id in signers.iter().filter(|s| s.as_str() != "self") {
            signer.sign(&mut raw, id, &keypair, None).unwrap();
        }

        let card = parse(&raw).unwrap();
        prop_assert_eq!(card.raw_model().unwrap(), raw);
    }

    #[test]
    fn prop_garbage_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = parse(&RawSignedModel::new(bytes));
    }
}

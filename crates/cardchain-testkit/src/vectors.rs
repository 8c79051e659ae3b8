//! Golden test vectors for deterministic verification.
//!
//! Expected values were computed with an independent SHA-512 and Ed25519
//! implementation. Any implementation of the card format must produce the
//! same snapshot bytes, identifiers, and (deterministic Ed25519) self
//! signatures.

use cardchain_core::{
    encode_content, Card, CardContent, CardId, Ed25519CardCrypto, Keypair, ModelSigner,
    RawSignedModel,
};

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Seed for deterministic key generation.
    pub seed: [u8; 32],
    pub identity: &'static str,
    /// Unix seconds.
    pub created_at: i64,
    /// Hex identifier of the replaced card.
    pub previous_card_id: Option<&'static str>,
    /// Expected content snapshot (UTF-8 JSON).
    pub expected_snapshot: &'static str,
    /// Expected identifier (hex).
    pub expected_identifier: &'static str,
    /// Expected self signature over the snapshot (hex).
    pub expected_self_signature: &'static str,
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "alice, first card",
            seed: [0x42; 32],
            identity: "alice",
            created_at: 1_600_000_000, // 2020-09-13T12:26:40Z
            previous_card_id: None,
            expected_snapshot: r#"{"identity":"alice","public_key":"IVL40Zt5HSRFMkLhXy6rbLfP+ntqXtMAl5YOBpiB2xI=","version":"5.0","created_at":1600000000}"#,
            expected_identifier: "ceff1385639db7937f944ae2798e004646eba411b8454d97104abbec1bf61b59",
            expected_self_signature: "e0941fc51e69dafa4b928601cc710d6acef43d1db8c368800484ea3d7ca484d8a0f061c57c116f7222e15cdfe3bfd80a75155eedc53cb1d7960ee04905a72e0e",
        },
        GoldenVector {
            name: "bob, first card",
            seed: [0x07; 32],
            identity: "bob",
            created_at: 1_600_000_100,
            previous_card_id: None,
            expected_snapshot: r#"{"identity":"bob","public_key":"6kpsY+KcUgq+9VB7Ey7F+ZVHdq6+vnuSQh7qaRRG0iw=","version":"5.0","created_at":1600000100}"#,
            expected_identifier: "870c5faf093b459e9f40761552c45f6dfdc23489efdab2c4a356a56e45f9bf94",
            expected_self_signature: "d1418180c184a1d585c3c7016b3c96d21d0bedbdf939822a3b0c50642ee3dfa8266631abcfcb766c6aa4e92df5e1e0ef692d22001e9f71f9a315c4d7c94e5e01",
        },
        GoldenVector {
            name: "bob, rotated key",
            seed: [0x08; 32],
            identity: "bob",
            created_at: 1_650_000_000,
            previous_card_id: Some("870c5faf093b459e9f40761552c45f6dfdc23489efdab2c4a356a56e45f9bf94"),
            expected_snapshot: r#"{"identity":"bob","public_key":"E5j2LG0aRXxRumpLXz29L2n8qTIWIY3ImX5Ba9F9k8o=","version":"5.0","created_at":1650000000,"previous_card_id":"870c5faf093b459e9f40761552c45f6dfdc23489efdab2c4a356a56e45f9bf94"}"#,
            expected_identifier: "61308a0e68872323fe990cf334c69f0f3094e6a11952ee007ed74e9be0f2580a",
            expected_self_signature: "8f5a063ce78f862cf0ba4be4a8b5fde5bada6aed3dd210c1c57a09246452f0968e4032d25691e2ad76f5dda6263c4467eaf5183952f13d258554047411ff5709",
        },
    ]
}

/// Build the self-signed raw model a vector describes.
pub fn generate_raw_from_vector(vector: &GoldenVector) -> RawSignedModel {
    let keypair = Keypair::from_seed(&vector.seed);
    let mut content = CardContent::new(vector.identity, keypair.public_key().as_bytes(), vector.created_at);
    if let Some(previous) = vector.previous_card_id {
        let previous = CardId::from_hex(previous).expect("vector previous id is hex");
        content = content.with_previous(&previous);
    }

    ModelSigner::new(&Ed25519CardCrypto)
        .generate(&content, &keypair, None)
        .expect("vector content encodes")
}

/// Check every vector, returning a description of each mismatch.
pub fn verify_all_vectors() -> Result<(), Vec<String>> {
    let mut failures = Vec::new();

    for vector in all_vectors() {
        let raw = generate_raw_from_vector(&vector);

        let keypair = Keypair::from_seed(&vector.seed);
        let mut content = CardContent::new(vector.identity, keypair.public_key().as_bytes(), vector.created_at);
        if let Some(previous) = vector.previous_card_id.and_then(|p| CardId::from_hex(p).ok()) {
            content = content.with_previous(&previous);
        }
        match encode_content(&content) {
            Ok(snapshot) if snapshot == vector.expected_snapshot.as_bytes() => {}
            _ => failures.push(format!("{}: snapshot mismatch", vector.name)),
        }

        match Card::parse(&Ed25519CardCrypto, &raw) {
            Some(card) if card.identifier().to_hex() == vector.expected_identifier => {}
            Some(card) => failures.push(format!(
                "{}: identifier {} != {}",
                vector.name,
                card.identifier(),
                vector.expected_identifier
            )),
            None => failures.push(format!("{}: does not parse", vector.name)),
        }

        let signature = raw.signature_by("self").map(|s| hex::encode(&s.signature));
        if signature.as_deref() != Some(vector.expected_self_signature) {
            failures.push(format!("{}: self signature mismatch", vector.name));
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_verify() {
        if let Err(failures) = verify_all_vectors() {
            panic!("golden vector failures: {:#?}", failures);
        }
    }

    #[test]
    fn test_rotation_vector_names_predecessor() {
        let vectors = all_vectors();
        assert_eq!(vectors[2].previous_card_id, Some(vectors[1].expected_identifier));
    }

    #[test]
    fn test_parsed_vector_snapshot_is_verbatim() {
        for vector in all_vectors() {
            let raw = RawSignedModel::new(vector.expected_snapshot.as_bytes().to_vec());
            let card = Card::parse(&Ed25519CardCrypto, &raw).unwrap();
            assert_eq!(card.content_snapshot().as_ref(), vector.expected_snapshot.as_bytes());
            assert_eq!(card.identifier().to_hex(), vector.expected_identifier);
        }
    }
}

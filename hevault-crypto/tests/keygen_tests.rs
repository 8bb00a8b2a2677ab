use hevault_crypto::{
    Context, CryptoError, CryptoResult, EntropySource, KeyMaterialGenerator, KeyRole, OsEntropy,
    SchemeCatalog, SchemeId, generate_keys, initialize_context,
};
use std::cell::RefCell;
use std::collections::HashSet;
use zeroize::Zeroizing;

/// Draws from the OS and keeps a copy of the last buffer handed out.
#[derive(Default)]
struct RecordingSource {
    last: RefCell<Vec<u8>>,
}

impl EntropySource for RecordingSource {
    fn generate(&self, size: usize) -> CryptoResult<Zeroizing<Vec<u8>>> {
        let buf = OsEntropy.generate(size)?;
        *self.last.borrow_mut() = buf.to_vec();
        Ok(buf)
    }
}

struct UnavailableSource;

impl EntropySource for UnavailableSource {
    fn generate(&self, _size: usize) -> CryptoResult<Zeroizing<Vec<u8>>> {
        Err(CryptoError::EntropySourceUnavailable(
            "getrandom: no entropy".to_string(),
        ))
    }
}

// ── Context ──────────────────────────────────────────────────────

#[test]
fn context_binds_scheme_parameters() {
    let context = initialize_context("approximate").unwrap();
    assert_eq!(context.scheme(), SchemeId::Approximate);
    assert_eq!(*context.params(), SchemeCatalog::lookup(SchemeId::Approximate));
    assert!(context.created_at() <= chrono::Utc::now());
}

#[test]
fn context_accepts_legacy_identifiers() {
    assert_eq!(initialize_context("ckks").unwrap().scheme(), SchemeId::Approximate);
    assert_eq!(initialize_context("bfv").unwrap().scheme(), SchemeId::ExactInteger);
    assert_eq!(initialize_context("paillier").unwrap().scheme(), SchemeId::Additive);
}

#[test]
fn unknown_scheme_rejected() {
    let err = initialize_context("rsa").unwrap_err();
    assert_eq!(err, CryptoError::UnknownScheme("rsa".to_string()));
}

#[test]
fn generator_without_context_fails() {
    let mut generator = KeyMaterialGenerator::new();
    assert_eq!(
        generator.generate_keys().unwrap_err(),
        CryptoError::ContextNotInitialized
    );
    assert_eq!(generator.summary().unwrap_err(), CryptoError::ContextNotInitialized);
}

#[test]
fn failed_reinitialization_keeps_previous_context() {
    let mut generator = KeyMaterialGenerator::new();
    generator.initialize_context("exact-integer").unwrap();
    assert!(generator.initialize_context("elgamal").is_err());
    assert_eq!(
        generator.context().map(Context::scheme),
        Some(SchemeId::ExactInteger)
    );
}

// ── Generation ───────────────────────────────────────────────────

#[test]
fn artifacts_come_from_disjoint_segments_of_one_buffer() {
    for id in SchemeId::ALL {
        let source = RecordingSource::default();
        let context = Context::new(id);
        let keys = generate_keys(&context, &source).unwrap();

        let material = source.last.borrow().clone();
        let segment_len = context.params().segment_len();
        assert_eq!(material.len(), context.params().key_material_len());

        for (index, artifact) in keys.artifacts().into_iter().enumerate() {
            let start = index * segment_len;
            let bytes = artifact.payload_bytes().unwrap();
            assert_eq!(
                bytes.as_slice(),
                &material[start..start + segment_len],
                "{id} {} segment",
                artifact.role().as_str()
            );
        }
    }
}

#[test]
fn artifacts_share_scheme_and_timestamp() {
    let context = Context::new(SchemeId::ExactInteger);
    let keys = generate_keys(&context, &OsEntropy).unwrap();

    for artifact in keys.artifacts() {
        assert_eq!(artifact.scheme(), SchemeId::ExactInteger);
        assert_eq!(artifact.created_at(), context.created_at());
    }
    assert_eq!(keys.scheme(), SchemeId::ExactInteger);
    assert_eq!(keys.created_at(), context.created_at());
}

#[test]
fn only_public_and_secret_echo_parameters() {
    let keys = generate_keys(&Context::new(SchemeId::Approximate), &OsEntropy).unwrap();

    let params = SchemeCatalog::lookup(SchemeId::Approximate);
    assert_eq!(keys.public.params(), Some(&params));
    assert_eq!(keys.secret.params(), Some(&params));
    assert_eq!(keys.relinearization.params(), None);
    assert_eq!(keys.rotation.params(), None);
}

#[test]
fn roles_assigned_in_fixed_order() {
    let keys = generate_keys(&Context::new(SchemeId::Additive), &OsEntropy).unwrap();
    let roles: Vec<KeyRole> = keys.artifacts().into_iter().map(|a| a.role()).collect();
    assert_eq!(roles, KeyRole::ORDER.to_vec());
}

#[test]
fn payloads_within_one_call_are_distinct() {
    for id in SchemeId::ALL {
        let keys = generate_keys(&Context::new(id), &OsEntropy).unwrap();
        let payloads: HashSet<&str> = keys.artifacts().into_iter().map(|a| a.payload()).collect();
        assert_eq!(payloads.len(), 4, "{id} artifacts must not share payloads");
    }
}

#[test]
fn thousand_generations_yield_distinct_secrets() {
    let mut generator = KeyMaterialGenerator::new();
    generator.initialize_context_for(SchemeId::Approximate);

    let mut seen = HashSet::new();
    for _ in 0..1000 {
        let keys = generator.generate_keys().unwrap();
        assert!(seen.insert(keys.secret.payload().to_string()));
    }
    assert_eq!(seen.len(), 1000);
}

#[test]
fn separate_contexts_yield_disjoint_payloads() {
    let a = generate_keys(&Context::new(SchemeId::ExactInteger), &OsEntropy).unwrap();
    let b = generate_keys(&Context::new(SchemeId::ExactInteger), &OsEntropy).unwrap();

    for left in a.artifacts() {
        for right in b.artifacts() {
            assert_ne!(left.payload(), right.payload());
        }
    }
}

#[test]
fn entropy_failure_propagates() {
    let mut generator = KeyMaterialGenerator::with_source(UnavailableSource);
    generator.initialize_context("approximate").unwrap();

    let err = generator.generate_keys().unwrap_err();
    assert!(matches!(err, CryptoError::EntropySourceUnavailable(_)));
}

#[test]
fn fingerprint_is_payload_prefix() {
    let keys = generate_keys(&Context::new(SchemeId::Approximate), &OsEntropy).unwrap();
    let fingerprint = keys.public.fingerprint();
    assert_eq!(fingerprint.len(), hevault_crypto::FINGERPRINT_LEN);
    assert!(keys.public.payload().starts_with(&fingerprint));
}

// ── Summary ──────────────────────────────────────────────────────

#[test]
fn summary_tracks_generation() {
    let mut generator = KeyMaterialGenerator::new();
    generator.initialize_context("bfv").unwrap();

    let before = generator.summary().unwrap();
    assert_eq!(before.scheme, SchemeId::ExactInteger);
    assert_eq!(before.security_level, 128);
    assert_eq!(before.description, "Fully Homomorphic (Integer operations)");
    assert!(!before.secret_key_generated);

    generator.generate_keys().unwrap();
    let after = generator.summary().unwrap();
    assert!(after.public_key_generated);
    assert!(after.secret_key_generated);
    assert!(after.relin_keys_generated);
    assert!(after.galois_keys_generated);
}

#[test]
fn summary_serializes_camel_case() {
    let mut generator = KeyMaterialGenerator::new();
    generator.initialize_context_for(SchemeId::Additive);
    let json = serde_json::to_value(generator.summary().unwrap()).unwrap();

    assert_eq!(json["scheme"], "additive");
    assert_eq!(json["securityLevel"], 128);
    assert_eq!(json["publicKeyGenerated"], false);
}

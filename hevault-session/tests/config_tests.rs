use hevault_crypto::SchemeId;
use hevault_session::{SessionConfig, SessionError};
use pretty_assertions::assert_eq;

#[test]
fn default_values() {
    let config = SessionConfig::default();
    assert_eq!(config.default_scheme, SchemeId::Approximate);
    assert_eq!(config.max_plaintext_bytes, 10 * 1024 * 1024);
    assert_eq!(config.allowed_extensions, vec!["txt".to_string()]);
    assert!(config.compress_exports);
    assert_eq!(config.encryption_step_delays_ms, [1000, 1500, 1500]);
    assert_eq!(config.decryption_step_delays_ms, [1500, 1500, 2000, 1000]);
    assert!(config.validate().is_ok());
}

#[test]
fn unpaced_keeps_limits() {
    let config = SessionConfig::unpaced();
    assert_eq!(config.encryption_step_delays_ms, [0; 3]);
    assert_eq!(config.decryption_step_delays_ms, [0; 4]);
    assert_eq!(config.max_plaintext_bytes, SessionConfig::default().max_plaintext_bytes);
}

#[test]
fn serde_roundtrip() {
    let config = SessionConfig {
        default_scheme: SchemeId::ExactInteger,
        compress_exports: false,
        ..SessionConfig::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains("\"exact-integer\""));
    let parsed: SessionConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn partial_json_fills_defaults() {
    let parsed: SessionConfig =
        serde_json::from_str(r#"{"default_scheme":"bfv","max_plaintext_bytes":1024}"#).unwrap();
    assert_eq!(parsed.default_scheme, SchemeId::ExactInteger);
    assert_eq!(parsed.max_plaintext_bytes, 1024);
    assert_eq!(parsed.allowed_extensions, vec!["txt".to_string()]);
}

#[test]
fn rejects_zero_size_limit() {
    let config = SessionConfig {
        max_plaintext_bytes: 0,
        ..SessionConfig::default()
    };
    assert!(matches!(config.validate(), Err(SessionError::Config(_))));
}

#[test]
fn rejects_missing_or_dotted_extensions() {
    let empty = SessionConfig {
        allowed_extensions: vec![],
        ..SessionConfig::default()
    };
    assert!(matches!(empty.validate(), Err(SessionError::Config(_))));

    let dotted = SessionConfig {
        allowed_extensions: vec![".txt".into()],
        ..SessionConfig::default()
    };
    let err = dotted.validate().unwrap_err();
    assert!(err.to_string().contains(".txt"));
}

#[test]
fn envelope_limit_scales_with_plaintext_limit() {
    let small = SessionConfig {
        max_plaintext_bytes: 1000,
        ..SessionConfig::default()
    };
    assert_eq!(small.max_envelope_bytes(), 6000 + 64 * 1024);
    assert!(SessionConfig::default().max_envelope_bytes() > 60 * 1024 * 1024);
}

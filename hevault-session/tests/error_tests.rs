use hevault_crypto::CryptoError;
use hevault_session::SessionError;

#[test]
fn crypto_errors_display_transparently() {
    let err: SessionError = CryptoError::SecretKeyMissing.into();
    assert_eq!(err.to_string(), "secret key required for decryption");
    assert!(matches!(err, SessionError::Crypto(CryptoError::SecretKeyMissing)));
}

#[test]
fn invalid_input_display() {
    let err = SessionError::InvalidInput("no file selected".into());
    assert_eq!(err.to_string(), "invalid input: no file selected");
}

#[test]
fn cancelled_display() {
    assert_eq!(SessionError::Cancelled.to_string(), "session cancelled");
}

#[test]
fn config_display() {
    let err = SessionError::Config("max_plaintext_bytes must be positive".into());
    assert_eq!(
        err.to_string(),
        "invalid configuration: max_plaintext_bytes must be positive"
    );
}

#[test]
fn from_io_error() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    let err: SessionError = io_err.into();
    assert!(matches!(err, SessionError::Io(_)));
    assert!(err.to_string().contains("missing"));
}

#[test]
fn json_failures_arrive_as_crypto_errors() {
    let err: SessionError = CryptoError::Serialization("expected value".into()).into();
    assert!(matches!(err, SessionError::Crypto(CryptoError::Serialization(_))));
    assert_eq!(err.to_string(), "serialization error: expected value");
}

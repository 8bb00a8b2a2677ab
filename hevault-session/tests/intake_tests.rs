use hevault_session::intake::{format_file_size, validate_upload};
use hevault_session::{SessionConfig, SessionError};

#[test]
fn accepts_text_file_within_limit() {
    let config = SessionConfig::default();
    assert!(validate_upload("notes.txt", 0, &config).is_ok());
    assert!(validate_upload("notes.txt", 10 * 1024 * 1024, &config).is_ok());
    assert!(validate_upload("NOTES.TXT", 42, &config).is_ok());
}

#[test]
fn rejects_other_extensions() {
    let config = SessionConfig::default();
    for name in ["notes.pdf", "notes", "notes.txt.exe", ".txt"] {
        let err = validate_upload(name, 10, &config).unwrap_err();
        assert!(matches!(err, SessionError::InvalidInput(_)), "{name}");
        assert!(err.to_string().contains(".txt file only"));
    }
}

#[test]
fn rejects_oversized_file() {
    let config = SessionConfig::default();
    let err = validate_upload("big.txt", 10 * 1024 * 1024 + 1, &config).unwrap_err();
    assert_eq!(err.to_string(), "invalid input: file size must be less than 10 MB");
}

#[test]
fn rejects_blank_name() {
    let err = validate_upload("  ", 1, &SessionConfig::default()).unwrap_err();
    assert_eq!(err.to_string(), "invalid input: no file selected");
}

#[test]
fn honours_configured_extensions() {
    let config = SessionConfig {
        allowed_extensions: vec!["txt".into(), "md".into()],
        max_plaintext_bytes: 100,
        ..SessionConfig::default()
    };
    assert!(validate_upload("readme.md", 100, &config).is_ok());
    assert!(validate_upload("readme.md", 101, &config).is_err());
    let err = validate_upload("data.csv", 1, &config).unwrap_err();
    assert!(err.to_string().contains(".txt, .md"));
}

#[test]
fn file_size_formatting() {
    assert_eq!(format_file_size(1024), "1 KB");
    assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3 GB");
}

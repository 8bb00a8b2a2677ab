//! Validation of user-supplied files before they reach the codec.

use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use std::path::Path;

/// Checks a plaintext upload's name and size against the session config.
pub fn validate_upload(file_name: &str, size: u64, config: &SessionConfig) -> SessionResult<()> {
    if file_name.trim().is_empty() {
        return Err(SessionError::InvalidInput("no file selected".to_string()));
    }

    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    if !config
        .allowed_extensions
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(extension))
    {
        let allowed = config
            .allowed_extensions
            .iter()
            .map(|ext| format!(".{ext}"))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(SessionError::InvalidInput(format!(
            "please select a {allowed} file only"
        )));
    }

    if size > config.max_plaintext_bytes {
        return Err(SessionError::InvalidInput(format!(
            "file size must be less than {}",
            format_file_size(config.max_plaintext_bytes)
        )));
    }

    Ok(())
}

/// Human-readable size: `0 Bytes`, `512 Bytes`, `1.5 KB`, `10 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", UNITS[unit])
}

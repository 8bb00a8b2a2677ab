//! Export file naming and envelope persistence.
//!
//! Envelopes are written as pretty JSON, optionally gzip-compressed. Reading
//! detects the gzip magic bytes, so both forms load transparently.

use crate::error::{SessionError, SessionResult};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use hevault_crypto::SchemeId;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// `ckks_secret_key_<file>.key`, labelled by scheme.
pub fn secret_key_file_name(scheme: SchemeId, file_name: Option<&str>) -> String {
    format!(
        "{}_secret_key_{}.key",
        scheme.block_label().to_ascii_lowercase(),
        file_name.unwrap_or("file")
    )
}

/// `encrypted_<file>`, with a `.gz` suffix when compressed.
pub fn encrypted_file_name(file_name: Option<&str>, compressed: bool) -> String {
    let mut name = format!("encrypted_{}", file_name.unwrap_or("file.txt"));
    if compressed {
        name.push_str(".gz");
    }
    name
}

/// Name for a recovered plaintext, derived from the envelope's file name.
///
/// Strips `.gz`, then `.encrypted`/`.enc`, then the `encrypted_` prefix and a
/// trailing `.txt`, and appends `_decrypted.txt`.
pub fn decrypted_file_name(envelope_file_name: Option<&str>) -> String {
    let Some(name) = envelope_file_name.filter(|n| !n.trim().is_empty()) else {
        return "decrypted.txt".to_string();
    };

    let mut stem = name.trim();
    stem = stem.strip_suffix(".gz").unwrap_or(stem);
    stem = stem
        .strip_suffix(".encrypted")
        .or_else(|| stem.strip_suffix(".enc"))
        .unwrap_or(stem);
    stem = stem.strip_prefix("encrypted_").unwrap_or(stem);
    stem = stem.strip_suffix(".txt").unwrap_or(stem);

    if stem.is_empty() {
        "decrypted.txt".to_string()
    } else {
        format!("{stem}_decrypted.txt")
    }
}

/// Gzip-compresses text.
pub fn compress(text: &str) -> SessionResult<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes())?;
    Ok(encoder.finish()?)
}

/// Returns `true` when the bytes start with the gzip magic number.
pub fn is_gzip(bytes: &[u8]) -> bool {
    bytes.starts_with(&GZIP_MAGIC)
}

/// Decompresses gzip input; passes anything else through unchanged.
///
/// Output longer than `limit` bytes, compressed or not, is rejected.
pub fn decompress_if_gzip(bytes: &[u8], limit: u64) -> SessionResult<Vec<u8>> {
    if !is_gzip(bytes) {
        if bytes.len() as u64 > limit {
            return Err(oversized(limit));
        }
        return Ok(bytes.to_vec());
    }
    let mut decoder = GzDecoder::new(bytes).take(limit.saturating_add(1));
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    if out.len() as u64 > limit {
        return Err(oversized(limit));
    }
    Ok(out)
}

fn oversized(limit: u64) -> SessionError {
    SessionError::InvalidInput(format!("encrypted file exceeds {limit} bytes"))
}

/// Decodes uploaded envelope bytes (plain or gzip) into text of at most `limit` bytes.
pub fn envelope_text_from_bytes(bytes: &[u8], limit: u64) -> SessionResult<String> {
    let raw = decompress_if_gzip(bytes, limit)?;
    String::from_utf8(raw)
        .map_err(|_| SessionError::InvalidInput("encrypted file is not valid UTF-8".to_string()))
}

/// Writes envelope text to `path`, gzip-compressed if requested.
pub fn write_envelope(path: &Path, envelope_text: &str, compressed: bool) -> SessionResult<()> {
    if compressed {
        fs::write(path, compress(envelope_text)?)?;
    } else {
        fs::write(path, envelope_text)?;
    }
    debug!("wrote envelope to {} (compressed: {compressed})", path.display());
    Ok(())
}

/// Reads envelope text from `path`, plain or gzip.
pub fn read_envelope(path: &Path, limit: u64) -> SessionResult<String> {
    let bytes = fs::read(path)?;
    envelope_text_from_bytes(&bytes, limit)
}

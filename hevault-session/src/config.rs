//! Session configuration.

use crate::error::{SessionError, SessionResult};
use hevault_crypto::SchemeId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ENVELOPE_OVERHEAD_BYTES: u64 = 64 * 1024;

/// Configuration shared by encryption and decryption sessions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Scheme used when the caller does not pick one.
    pub default_scheme: SchemeId,

    /// Largest accepted plaintext upload, in bytes.
    pub max_plaintext_bytes: u64,

    /// File extensions accepted for plaintext uploads (without the dot).
    pub allowed_extensions: Vec<String>,

    /// Gzip exported envelopes.
    pub compress_exports: bool,

    /// Pause after each encryption step (context, keys, encrypt), in milliseconds.
    pub encryption_step_delays_ms: [u64; 3],

    /// Pause after each decryption step (key, context, decrypt, complete), in milliseconds.
    pub decryption_step_delays_ms: [u64; 4],
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_scheme: SchemeId::Approximate,
            max_plaintext_bytes: 10 * 1024 * 1024, // 10MB
            allowed_extensions: vec!["txt".to_string()],
            compress_exports: true,
            encryption_step_delays_ms: [1000, 1500, 1500],
            decryption_step_delays_ms: [1500, 1500, 2000, 1000],
        }
    }
}

impl SessionConfig {
    /// Config without pacing delays, for tests and batch use.
    pub fn unpaced() -> Self {
        Self {
            encryption_step_delays_ms: [0; 3],
            decryption_step_delays_ms: [0; 4],
            ..Self::default()
        }
    }

    /// Checks limits before a session is built on this config.
    pub fn validate(&self) -> SessionResult<()> {
        if self.max_plaintext_bytes == 0 {
            return Err(SessionError::Config(
                "max_plaintext_bytes must be positive".to_string(),
            ));
        }
        if self.allowed_extensions.is_empty() {
            return Err(SessionError::Config(
                "allowed_extensions must not be empty".to_string(),
            ));
        }
        if let Some(ext) = self
            .allowed_extensions
            .iter()
            .find(|ext| ext.is_empty() || ext.starts_with('.'))
        {
            return Err(SessionError::Config(format!(
                "invalid extension {ext:?} (expected a bare extension such as \"txt\")"
            )));
        }
        Ok(())
    }

    /// Largest accepted envelope text, in bytes.
    ///
    /// Sized to the envelope of a maximal plaintext: each byte becomes at most
    /// four JSON characters, which base64 widens by 4/3, plus a fixed margin
    /// for the surrounding record.
    pub fn max_envelope_bytes(&self) -> u64 {
        self.max_plaintext_bytes
            .saturating_mul(6)
            .saturating_add(ENVELOPE_OVERHEAD_BYTES)
    }

    pub(crate) fn encryption_delay(&self, step: usize) -> Duration {
        Duration::from_millis(self.encryption_step_delays_ms.get(step).copied().unwrap_or(0))
    }

    pub(crate) fn decryption_delay(&self, step: usize) -> Duration {
        Duration::from_millis(self.decryption_step_delays_ms.get(step).copied().unwrap_or(0))
    }
}

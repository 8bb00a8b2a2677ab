//! Encryption and decryption sessions.
//!
//! An [`EncryptionSession`] takes a plaintext upload through context setup, key
//! generation and sealing. A [`DecryptionSession`] pairs an uploaded envelope
//! with a pasted secret key and opens it. Both can be driven step by step or
//! through their paced `run` pipelines.

use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::export::{
    decrypted_file_name, encrypted_file_name, envelope_text_from_bytes, secret_key_file_name,
    write_envelope,
};
use crate::intake::validate_upload;
use crate::pacing::{DECRYPTION_STEPS, ENCRYPTION_STEPS, StepPacer};
use chrono::{DateTime, Utc};
use hevault_crypto::{
    CryptoError, EntropySource, Envelope, KeyGenerationSummary, KeyHandle, KeyMaterialGenerator,
    KeyQuadruple, OsEntropy, PlaintextUnit, SchemeId, decode_text, encode, parse_secret,
    render_public, render_secret,
};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

// ── Encryption ──

/// Everything produced by one encryption: the envelope plus the key texts
/// the user must keep.
#[derive(Clone)]
pub struct EncryptionResult {
    pub scheme: SchemeId,
    pub envelope_text: String,
    pub secret_key_text: Zeroizing<String>,
    pub public_key_text: String,
    pub file_name: Option<String>,
    pub envelope_file_name: String,
    pub secret_key_file_name: String,
    pub original_length: usize,
    pub compressed: bool,
    pub timestamp: DateTime<Utc>,
}

impl EncryptionResult {
    /// Writes the envelope into `dir` under its export name.
    pub fn save_envelope(&self, dir: &Path) -> SessionResult<PathBuf> {
        let path = dir.join(&self.envelope_file_name);
        write_envelope(&path, &self.envelope_text, self.compressed)?;
        Ok(path)
    }

    /// Writes the secret key block into `dir` under its export name.
    pub fn save_secret_key(&self, dir: &Path) -> SessionResult<PathBuf> {
        let path = dir.join(&self.secret_key_file_name);
        fs::write(&path, self.secret_key_text.as_bytes())?;
        Ok(path)
    }
}

impl fmt::Debug for EncryptionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionResult")
            .field("scheme", &self.scheme)
            .field("file_name", &self.file_name)
            .field("envelope_file_name", &self.envelope_file_name)
            .field("secret_key_file_name", &self.secret_key_file_name)
            .field("original_length", &self.original_length)
            .field("secret_key_text", &"[REDACTED]")
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

/// Holds one plaintext and the keys generated for it.
pub struct EncryptionSession<S: EntropySource = OsEntropy> {
    config: SessionConfig,
    generator: KeyMaterialGenerator<S>,
    keys: Option<KeyQuadruple>,
    plaintext: Option<PlaintextUnit>,
    file_name: Option<String>,
}

impl EncryptionSession<OsEntropy> {
    pub fn new(config: SessionConfig) -> SessionResult<Self> {
        Self::with_source(config, OsEntropy)
    }
}

impl<S: EntropySource> EncryptionSession<S> {
    /// Session drawing key material from `source`.
    pub fn with_source(config: SessionConfig, source: S) -> SessionResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            generator: KeyMaterialGenerator::with_source(source),
            keys: None,
            plaintext: None,
            file_name: None,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Accepts a plaintext file upload after checking its name and size.
    pub fn load_file(&mut self, file_name: &str, bytes: Vec<u8>) -> SessionResult<()> {
        validate_upload(file_name, bytes.len() as u64, &self.config)?;
        debug!("loaded {file_name} ({} bytes)", bytes.len());
        self.plaintext = Some(PlaintextUnit::new(bytes));
        self.file_name = Some(file_name.to_string());
        Ok(())
    }

    /// Accepts typed text in place of a file.
    pub fn load_text(&mut self, text: &str) -> SessionResult<()> {
        if text.len() as u64 > self.config.max_plaintext_bytes {
            return Err(SessionError::InvalidInput(format!(
                "text exceeds {} bytes",
                self.config.max_plaintext_bytes
            )));
        }
        self.plaintext = Some(PlaintextUnit::from_text(text));
        self.file_name = None;
        Ok(())
    }

    pub fn plaintext(&self) -> Option<&PlaintextUnit> {
        self.plaintext.as_ref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Sets up a context for `scheme`, or the configured default.
    ///
    /// Keys from a previous context are discarded.
    pub fn initialize(&mut self, scheme: Option<&str>) -> SessionResult<SchemeId> {
        let id = match scheme {
            Some(s) => self.generator.initialize_context(s)?.scheme(),
            None => self
                .generator
                .initialize_context_for(self.config.default_scheme)
                .scheme(),
        };
        self.keys = None;
        Ok(id)
    }

    /// Generates a fresh key quadruple, replacing any previous one.
    pub fn generate_keys(&mut self) -> SessionResult<&KeyQuadruple> {
        let keys = self.generator.generate_keys()?;
        info!("generated {} key set", keys.scheme());
        Ok(self.keys.insert(keys))
    }

    pub fn keys(&self) -> Option<&KeyQuadruple> {
        self.keys.as_ref()
    }

    pub fn summary(&self) -> SessionResult<KeyGenerationSummary> {
        Ok(self.generator.summary()?)
    }

    /// Seals the loaded plaintext and renders the key texts.
    ///
    /// The plaintext is released once sealing succeeds.
    pub fn encrypt(&mut self) -> SessionResult<EncryptionResult> {
        let keys = self.keys.as_ref().ok_or(CryptoError::PublicKeyMissing)?;
        let plaintext = self
            .plaintext
            .as_ref()
            .ok_or_else(|| SessionError::InvalidInput("no plaintext loaded".to_string()))?;

        let envelope = encode(plaintext, &keys.public)?;
        let compressed = self.config.compress_exports;
        let result = EncryptionResult {
            scheme: keys.scheme(),
            envelope_text: envelope.to_text()?,
            secret_key_text: Zeroizing::new(render_secret(&keys.secret)?),
            public_key_text: render_public(&keys.public)?,
            file_name: self.file_name.clone(),
            envelope_file_name: encrypted_file_name(self.file_name.as_deref(), compressed),
            secret_key_file_name: secret_key_file_name(keys.scheme(), self.file_name.as_deref()),
            original_length: plaintext.original_length(),
            compressed,
            timestamp: Utc::now(),
        };

        self.plaintext = None;
        info!(
            "encrypted {} bytes with {}",
            result.original_length, result.scheme
        );
        Ok(result)
    }

    /// Paced pipeline: context, keys, encryption.
    pub async fn run(
        &mut self,
        scheme: Option<&str>,
        pacer: &mut StepPacer,
    ) -> SessionResult<EncryptionResult> {
        let result = self.run_steps(scheme, pacer).await;
        if let Err(e) = &result {
            warn!("encryption pipeline stopped: {e}");
        }
        result
    }

    async fn run_steps(
        &mut self,
        scheme: Option<&str>,
        pacer: &mut StepPacer,
    ) -> SessionResult<EncryptionResult> {
        if self.plaintext.is_none() {
            return Err(SessionError::InvalidInput("no plaintext loaded".to_string()));
        }

        pacer
            .step(ENCRYPTION_STEPS[0], self.config.encryption_delay(0))
            .await?;
        self.initialize(scheme)?;

        pacer
            .step(ENCRYPTION_STEPS[1], self.config.encryption_delay(1))
            .await?;
        self.generate_keys()?;

        pacer
            .step(ENCRYPTION_STEPS[2], self.config.encryption_delay(2))
            .await?;
        let result = self.encrypt()?;

        pacer.finish();
        Ok(result)
    }
}

// ── Decryption ──

/// A recovered plaintext and the name to save it under.
#[derive(Debug, Clone)]
pub struct DecryptionOutcome {
    pub scheme: SchemeId,
    pub plaintext: PlaintextUnit,
    pub file_name: String,
    pub timestamp: DateTime<Utc>,
}

impl DecryptionOutcome {
    /// The plaintext as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> String {
        self.plaintext.to_text_lossy()
    }

    /// Space-separated byte values of the plaintext.
    pub fn ascii_preview(&self) -> String {
        self.plaintext.ascii_preview()
    }

    /// Writes the plaintext into `dir` under its export name.
    pub fn save(&self, dir: &Path) -> SessionResult<PathBuf> {
        let path = dir.join(&self.file_name);
        fs::write(&path, self.plaintext.as_bytes())?;
        Ok(path)
    }
}

/// Pairs an uploaded envelope with a secret key.
pub struct DecryptionSession {
    config: SessionConfig,
    envelope_text: Option<String>,
    envelope_file_name: Option<String>,
    secret: Option<KeyHandle>,
}

impl DecryptionSession {
    pub fn new(config: SessionConfig) -> SessionResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            envelope_text: None,
            envelope_file_name: None,
            secret: None,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Accepts an envelope upload, plain or gzip.
    pub fn load_envelope(&mut self, file_name: &str, bytes: &[u8]) -> SessionResult<()> {
        let text = envelope_text_from_bytes(bytes, self.config.max_envelope_bytes())?;
        self.load_envelope_text(text)?;
        self.envelope_file_name = Some(file_name.to_string());
        Ok(())
    }

    /// Accepts envelope text directly.
    pub fn load_envelope_text(&mut self, text: String) -> SessionResult<()> {
        let envelope = Envelope::from_text(&text)?;
        debug!(
            "loaded {} envelope ({} bytes declared)",
            envelope.scheme, envelope.original_length
        );
        self.envelope_text = Some(text);
        self.envelope_file_name = None;
        Ok(())
    }

    /// Parses a pasted secret key. Blank input clears the current key.
    pub fn load_secret_key(&mut self, text: &str) -> SessionResult<()> {
        if text.trim().is_empty() {
            self.secret = None;
            return Ok(());
        }
        let handle = parse_secret(text)?;
        debug!("loaded {} secret key", handle.scheme());
        self.secret = Some(handle);
        Ok(())
    }

    pub fn has_envelope(&self) -> bool {
        self.envelope_text.is_some()
    }

    pub fn has_secret_key(&self) -> bool {
        self.secret.is_some()
    }

    pub fn is_ready(&self) -> bool {
        self.has_envelope() && self.has_secret_key()
    }

    /// Opens the loaded envelope.
    ///
    /// The secret key is consumed whether or not decryption succeeds.
    pub fn decrypt(&mut self) -> SessionResult<DecryptionOutcome> {
        let envelope_text = self
            .envelope_text
            .as_deref()
            .ok_or_else(|| SessionError::InvalidInput("no encrypted file loaded".to_string()))?;
        let secret = self.secret.take().ok_or(CryptoError::SecretKeyMissing)?;

        let plaintext = decode_text(envelope_text, &secret)?;
        let scheme = secret.scheme();
        drop(secret);

        info!("decrypted {} bytes with {scheme}", plaintext.original_length());
        Ok(DecryptionOutcome {
            scheme,
            plaintext,
            file_name: decrypted_file_name(self.envelope_file_name.as_deref()),
            timestamp: Utc::now(),
        })
    }

    /// Paced pipeline: key check, context, decryption, completion.
    pub async fn run(&mut self, pacer: &mut StepPacer) -> SessionResult<DecryptionOutcome> {
        let outcome = self.run_steps(pacer).await;
        if let Err(e) = &outcome {
            warn!("decryption pipeline stopped: {e}");
        }
        outcome
    }

    async fn run_steps(&mut self, pacer: &mut StepPacer) -> SessionResult<DecryptionOutcome> {
        pacer
            .step(DECRYPTION_STEPS[0], self.config.decryption_delay(0))
            .await?;
        if self.secret.is_none() {
            return Err(CryptoError::SecretKeyMissing.into());
        }

        pacer
            .step(DECRYPTION_STEPS[1], self.config.decryption_delay(1))
            .await?;
        if self.envelope_text.is_none() {
            return Err(SessionError::InvalidInput("no encrypted file loaded".to_string()));
        }

        pacer
            .step(DECRYPTION_STEPS[2], self.config.decryption_delay(2))
            .await?;
        let outcome = self.decrypt()?;

        // Not cancellable: the secret key has been consumed.
        pacer
            .conclude(DECRYPTION_STEPS[3], self.config.decryption_delay(3))
            .await;
        Ok(outcome)
    }
}

//! Plaintext envelopes bound to a public key.
//!
//! An envelope is a reversible structural encoding, not a cipher. Sealing
//! builds a composite record from the plaintext bytes, the plaintext length,
//! a fingerprint of the public key, the scheme scale, and a timestamp, then
//! serializes it to JSON and base64. Everything needed to open the envelope
//! travels inside it.
//!
//! Opening checks structure and the scheme tag only. It does not check that
//! the secret key belongs to the public key used to seal: any well-formed
//! envelope of the right scheme opens under any secret key of that scheme.

use crate::error::{CryptoError, CryptoResult};
use crate::key_format::KeyHandle;
use crate::keygen::{KeyArtifact, KeyRole};
use crate::scheme::{SchemeCatalog, SchemeId};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A byte sequence together with its exact original length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaintextUnit {
    bytes: Vec<u8>,
}

impl PlaintextUnit {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn from_text(text: &str) -> Self {
        Self::new(text.as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn original_length(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decodes the bytes as UTF-8, replacing invalid sequences.
    pub fn to_text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    /// Space-separated decimal byte values.
    pub fn ascii_preview(&self) -> String {
        self.bytes
            .iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<&str> for PlaintextUnit {
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}

impl From<Vec<u8>> for PlaintextUnit {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

/// The composite record carried inside an envelope's ciphertext.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SealedRecord {
    vector: Vec<u8>,
    #[serde(default)]
    original_length: Option<usize>,
    public_key_hash: String,
    #[serde(default)]
    scale: Option<u64>,
    timestamp: i64,
}

/// A sealed plaintext.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(alias = "method")]
    pub scheme: SchemeId,
    /// Base64 of the JSON composite record.
    pub ciphertext: String,
    pub original_length: usize,
    #[serde(default, alias = "polyModulusDegree", skip_serializing_if = "Option::is_none")]
    pub ring_degree: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u64>,
    #[serde(default = "sealed")]
    pub encrypted: bool,
}

fn sealed() -> bool {
    true
}

impl Envelope {
    /// Pretty JSON text for storage or transport.
    pub fn to_text(&self) -> CryptoResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses envelope text produced by [`Envelope::to_text`].
    pub fn from_text(text: &str) -> CryptoResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| CryptoError::MalformedEnvelope(format!("invalid envelope text: {e}")))
    }
}

/// Seals a plaintext under a public artifact.
pub fn encode(plaintext: &PlaintextUnit, public: &KeyArtifact) -> CryptoResult<Envelope> {
    if public.role() != KeyRole::Public {
        return Err(CryptoError::PublicKeyMissing);
    }

    let params = public
        .params()
        .copied()
        .unwrap_or_else(|| SchemeCatalog::lookup(public.scheme()));

    let record = SealedRecord {
        vector: plaintext.as_bytes().to_vec(),
        original_length: Some(plaintext.original_length()),
        public_key_hash: public.fingerprint(),
        scale: params.scale(),
        timestamp: Utc::now().timestamp_millis(),
    };
    let ciphertext = STANDARD.encode(serde_json::to_vec(&record)?);

    debug!(
        "sealed {} bytes under {} public key",
        plaintext.original_length(),
        public.scheme()
    );

    Ok(Envelope {
        scheme: public.scheme(),
        ciphertext,
        original_length: plaintext.original_length(),
        ring_degree: params.ring_degree(),
        scale: params.scale(),
        encrypted: true,
    })
}

/// Opens an envelope with a secret key handle.
pub fn decode(envelope: &Envelope, secret: &KeyHandle) -> CryptoResult<PlaintextUnit> {
    let raw = STANDARD
        .decode(envelope.ciphertext.trim().as_bytes())
        .map_err(|_| CryptoError::MalformedEnvelope("ciphertext is not valid base64".to_string()))?;
    let record: SealedRecord = serde_json::from_slice(&raw)
        .map_err(|e| CryptoError::MalformedEnvelope(format!("invalid sealed record: {e}")))?;

    if envelope.scheme != secret.scheme() {
        return Err(CryptoError::SchemeMismatch {
            envelope: envelope.scheme.to_string(),
            key: secret.scheme().to_string(),
        });
    }

    let original_length = record.original_length.unwrap_or(envelope.original_length);
    if original_length > record.vector.len() {
        return Err(CryptoError::MalformedEnvelope(format!(
            "declared length {original_length} exceeds {} sealed bytes",
            record.vector.len()
        )));
    }

    let mut bytes = record.vector;
    bytes.truncate(original_length);

    debug!("opened {} byte {} envelope", bytes.len(), envelope.scheme);
    Ok(PlaintextUnit::new(bytes))
}

/// Parses envelope text and opens it.
pub fn decode_text(text: &str, secret: &KeyHandle) -> CryptoResult<PlaintextUnit> {
    decode(&Envelope::from_text(text)?, secret)
}

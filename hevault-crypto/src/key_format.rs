//! Textual forms of key artifacts.
//!
//! The secret key is exported in one of two shapes:
//!
//! - **Additive scheme**: a JSON record carrying the raw `lambda` / `mu`
//!   fields (the two halves of the secret segment).
//! - **Polynomial schemes**: a delimited block
//!
//! ```text
//! -----BEGIN CKKS SECRET KEY-----
//! <base64 payload>
//!
//! Polynomial Modulus Degree: 8192
//! Coefficient Modulus: 60, 40, 40, 60
//! Scale: 1099511627776
//! Security Level: 128-bit
//! Generated: 2026-01-01T00:00:00.000Z
//! -----END CKKS SECRET KEY-----
//! ```
//!
//! Parsing a block does not follow a strict grammar: the first line longer
//! than [`PAYLOAD_LINE_THRESHOLD`] characters is taken as the payload. Every
//! block produced by [`render_secret`] satisfies this, since payload lines
//! are well over a thousand characters and parameter lines are short.

use crate::error::{CryptoError, CryptoResult};
use crate::keygen::{KeyArtifact, KeyRole};
use crate::scheme::{SchemeCatalog, SchemeId, SchemeParameters};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// A line must be longer than this to be taken as the payload carrier.
pub const PAYLOAD_LINE_THRESHOLD: usize = 100;

const BLOCK_PREFIX: &str = "-----BEGIN ";
const BLOCK_SUFFIX: &str = " SECRET KEY-----";

/// A secret key recovered from its textual form.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyHandle {
    #[zeroize(skip)]
    scheme: SchemeId,
    payload: String,
}

impl KeyHandle {
    /// Wraps an in-memory secret artifact without going through text.
    pub fn from_secret(artifact: &KeyArtifact) -> CryptoResult<Self> {
        if artifact.role() != KeyRole::Secret {
            return Err(CryptoError::SecretKeyMissing);
        }
        Ok(Self {
            scheme: artifact.scheme(),
            payload: artifact.payload().to_string(),
        })
    }

    pub fn scheme(&self) -> SchemeId {
        self.scheme
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Decoded payload bytes.
    pub fn payload_bytes(&self) -> CryptoResult<Zeroizing<Vec<u8>>> {
        STANDARD
            .decode(self.payload.as_bytes())
            .map(Zeroizing::new)
            .map_err(|_| CryptoError::MalformedKey("payload is not valid base64".to_string()))
    }
}

impl fmt::Debug for KeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyHandle")
            .field("scheme", &self.scheme)
            .field("payload", &"<redacted>")
            .finish()
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdditiveSecretRecord {
    method: SchemeId,
    lambda: Zeroizing<String>,
    mu: Zeroizing<String>,
    key_size: u32,
    generated: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PublicKeyRecord<'a> {
    method: SchemeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    public_key: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    n: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    g: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ring_degree: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scale: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    plain_modulus: Option<u64>,
    security_level: u32,
    generated: String,
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn echoed_params(artifact: &KeyArtifact) -> SchemeParameters {
    artifact
        .params()
        .copied()
        .unwrap_or_else(|| SchemeCatalog::lookup(artifact.scheme()))
}

/// Splits a segment into two base64 halves.
fn split_halves(artifact: &KeyArtifact) -> CryptoResult<(Zeroizing<String>, Zeroizing<String>)> {
    let bytes = artifact.payload_bytes()?;
    let (first, second) = bytes.split_at(bytes.len() / 2);
    Ok((
        Zeroizing::new(STANDARD.encode(first)),
        Zeroizing::new(STANDARD.encode(second)),
    ))
}

/// Renders a secret artifact for export.
pub fn render_secret(secret: &KeyArtifact) -> CryptoResult<String> {
    if secret.role() != KeyRole::Secret {
        return Err(CryptoError::SecretKeyMissing);
    }

    let params = echoed_params(secret);
    match params {
        SchemeParameters::Additive(additive) => {
            let (lambda, mu) = split_halves(secret)?;
            let record = AdditiveSecretRecord {
                method: SchemeId::Additive,
                lambda,
                mu,
                key_size: additive.key_size_bits,
                generated: secret.created_at(),
            };
            Ok(serde_json::to_string_pretty(&record)?)
        }
        SchemeParameters::Approximate(p) => Ok(render_block(
            secret,
            p.ring_degree,
            p.modulus_chain,
            &format!("Scale: {}", p.scale),
        )),
        SchemeParameters::ExactInteger(p) => Ok(render_block(
            secret,
            p.ring_degree,
            p.modulus_chain,
            &format!("Plain Modulus: {}", p.plain_modulus),
        )),
    }
}

fn render_block(
    secret: &KeyArtifact,
    ring_degree: usize,
    modulus_chain: &[u32],
    modulus_line: &str,
) -> String {
    let label = secret.scheme().block_label();
    let chain = modulus_chain
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "{BLOCK_PREFIX}{label}{BLOCK_SUFFIX}\n\
         {payload}\n\
         \n\
         Polynomial Modulus Degree: {ring_degree}\n\
         Coefficient Modulus: {chain}\n\
         {modulus_line}\n\
         Security Level: {level}-bit\n\
         Generated: {generated}\n\
         -----END {label}{BLOCK_SUFFIX}",
        payload = secret.payload(),
        level = crate::scheme::SECURITY_LEVEL_BITS,
        generated = timestamp(secret.created_at()),
    )
}

/// Renders a public artifact as a shareable JSON record.
pub fn render_public(public: &KeyArtifact) -> CryptoResult<String> {
    if public.role() != KeyRole::Public {
        return Err(CryptoError::PublicKeyMissing);
    }

    let params = echoed_params(public);
    let mut record = PublicKeyRecord {
        method: public.scheme(),
        public_key: None,
        n: None,
        g: None,
        key_size: params.key_size_bits(),
        ring_degree: params.ring_degree(),
        scale: params.scale(),
        plain_modulus: params.plain_modulus(),
        security_level: params.security_level_bits(),
        generated: timestamp(public.created_at()),
    };

    if let SchemeParameters::Additive(_) = params {
        let (n, g) = split_halves(public)?;
        record.n = Some(String::clone(&n));
        record.g = Some(String::clone(&g));
    } else {
        record.public_key = Some(public.payload());
    }

    Ok(serde_json::to_string_pretty(&record)?)
}

/// Parses an exported secret key back into a handle.
pub fn parse_secret(text: &str) -> CryptoResult<KeyHandle> {
    if text.trim_start().starts_with('{') {
        return parse_record(text);
    }

    let scheme = match text.lines().find_map(block_label) {
        Some(label) => SchemeId::from_block_label(label).ok_or_else(|| {
            CryptoError::MalformedKey(format!("unrecognized key block label {label:?}"))
        })?,
        // Unlabelled blocks are read as the approximate scheme
        None => SchemeId::Approximate,
    };

    let payload = text
        .lines()
        .find(|line| line.len() > PAYLOAD_LINE_THRESHOLD)
        .ok_or_else(|| {
            CryptoError::MalformedKey(format!(
                "no line longer than {PAYLOAD_LINE_THRESHOLD} characters"
            ))
        })?;

    Ok(KeyHandle {
        scheme,
        payload: payload.trim().to_string(),
    })
}

fn block_label(line: &str) -> Option<&str> {
    line.trim()
        .strip_prefix(BLOCK_PREFIX)?
        .strip_suffix(BLOCK_SUFFIX)
}

fn parse_record(text: &str) -> CryptoResult<KeyHandle> {
    let record: AdditiveSecretRecord = serde_json::from_str(text)
        .map_err(|e| CryptoError::MalformedKey(format!("invalid key record: {e}")))?;

    if record.method != SchemeId::Additive {
        return Err(CryptoError::MalformedKey(format!(
            "record form is not used by the {} scheme",
            record.method
        )));
    }

    let decode = |field: &str, value: &str| {
        STANDARD
            .decode(value.as_bytes())
            .map(Zeroizing::new)
            .map_err(|_| CryptoError::MalformedKey(format!("{field} is not valid base64")))
    };
    let mut bytes = decode("lambda", record.lambda.as_str())?;
    bytes.extend_from_slice(&decode("mu", record.mu.as_str())?);

    Ok(KeyHandle {
        scheme: SchemeId::Additive,
        payload: STANDARD.encode(bytes.as_slice()),
    })
}

//! Key material generation.
//!
//! A generation event draws one random buffer sized to the scheme's nominal
//! key or ring size and carves it into four contiguous, non-overlapping
//! segments, assigned in fixed order:
//!
//! | Segment | Role            |
//! |---------|-----------------|
//! | 0       | Public          |
//! | 1       | Secret          |
//! | 2       | Relinearization |
//! | 3       | Rotation        |
//!
//! Each segment is base64-encoded into its artifact's payload. All four
//! artifacts share the context's scheme and creation time; only the public
//! and secret artifacts echo the scheme parameters.

use crate::entropy::{EntropySource, OsEntropy};
use crate::error::{CryptoError, CryptoResult};
use crate::scheme::{SchemeCatalog, SchemeId, SchemeParameters};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use zeroize::Zeroizing;

/// Number of characters of the public payload used as its fingerprint.
pub const FINGERPRINT_LEN: usize = 32;

/// The role an artifact plays within a key quadruple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyRole {
    Public,
    Secret,
    Relinearization,
    Rotation,
}

impl KeyRole {
    /// Segment assignment order.
    pub const ORDER: [KeyRole; 4] = [
        KeyRole::Public,
        KeyRole::Secret,
        KeyRole::Relinearization,
        KeyRole::Rotation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            KeyRole::Public => "public",
            KeyRole::Secret => "secret",
            KeyRole::Relinearization => "relinearization",
            KeyRole::Rotation => "rotation",
        }
    }

    fn echoes_params(self) -> bool {
        matches!(self, KeyRole::Public | KeyRole::Secret)
    }
}

/// Binds a scheme to its parameters and a creation timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Context {
    params: SchemeParameters,
    created_at: DateTime<Utc>,
}

impl Context {
    /// Builds a context for a scheme, capturing the current time.
    pub fn new(scheme: SchemeId) -> Self {
        Self {
            params: SchemeCatalog::lookup(scheme),
            created_at: Utc::now(),
        }
    }

    pub fn scheme(&self) -> SchemeId {
        self.params.scheme_id()
    }

    pub fn params(&self) -> &SchemeParameters {
        &self.params
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Builds a context from a textual scheme identifier.
pub fn initialize_context(scheme: &str) -> CryptoResult<Context> {
    let id: SchemeId = scheme.parse()?;
    Ok(Context::new(id))
}

/// One key component produced by a generation event.
#[derive(Clone)]
pub struct KeyArtifact {
    role: KeyRole,
    scheme: SchemeId,
    payload: Zeroizing<String>,
    params: Option<SchemeParameters>,
    created_at: DateTime<Utc>,
}

impl KeyArtifact {
    fn from_segment(role: KeyRole, context: &Context, segment: &[u8]) -> Self {
        Self {
            role,
            scheme: context.scheme(),
            payload: Zeroizing::new(STANDARD.encode(segment)),
            params: role.echoes_params().then_some(context.params),
            created_at: context.created_at,
        }
    }

    pub fn role(&self) -> KeyRole {
        self.role
    }

    pub fn scheme(&self) -> SchemeId {
        self.scheme
    }

    /// Base64 text of this artifact's segment.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Decoded segment bytes.
    pub fn payload_bytes(&self) -> CryptoResult<Zeroizing<Vec<u8>>> {
        STANDARD
            .decode(self.payload.as_bytes())
            .map(Zeroizing::new)
            .map_err(|_| {
                CryptoError::InvalidParameter(format!(
                    "{} key payload is not valid base64",
                    self.role.as_str()
                ))
            })
    }

    /// Echoed scheme parameters (public and secret artifacts only).
    pub fn params(&self) -> Option<&SchemeParameters> {
        self.params.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Short prefix of the payload text, used to tag envelopes.
    pub fn fingerprint(&self) -> String {
        self.payload.chars().take(FINGERPRINT_LEN).collect()
    }
}

impl fmt::Debug for KeyArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("KeyArtifact");
        s.field("role", &self.role).field("scheme", &self.scheme);
        if self.role == KeyRole::Secret {
            s.field("payload", &"<redacted>");
        } else {
            s.field("payload_len", &self.payload.len());
        }
        s.field("params", &self.params)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// The four artifacts of one generation event.
#[derive(Clone, Debug)]
pub struct KeyQuadruple {
    pub public: KeyArtifact,
    pub secret: KeyArtifact,
    pub relinearization: KeyArtifact,
    pub rotation: KeyArtifact,
}

impl KeyQuadruple {
    pub fn scheme(&self) -> SchemeId {
        self.public.scheme
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.public.created_at
    }

    /// Artifacts in segment order.
    pub fn artifacts(&self) -> [&KeyArtifact; 4] {
        [
            &self.public,
            &self.secret,
            &self.relinearization,
            &self.rotation,
        ]
    }
}

/// Generates a key quadruple for an initialized context.
pub fn generate_keys<S: EntropySource + ?Sized>(
    context: &Context,
    source: &S,
) -> CryptoResult<KeyQuadruple> {
    let params = context.params();
    let segment_len = params.segment_len();
    let material = source.generate(params.key_material_len())?;

    if material.len() < segment_len * KeyRole::ORDER.len() {
        return Err(CryptoError::InvalidParameter(format!(
            "entropy source returned {} bytes, need at least {}",
            material.len(),
            segment_len * KeyRole::ORDER.len()
        )));
    }

    let [public, secret, relinearization, rotation]: [KeyArtifact; 4] =
        std::array::from_fn(|index| {
            let start = index * segment_len;
            KeyArtifact::from_segment(
                KeyRole::ORDER[index],
                context,
                &material[start..start + segment_len],
            )
        });

    debug!(
        "generated {} key quadruple ({} byte segments) at {}",
        context.scheme(),
        segment_len,
        context.created_at()
    );

    Ok(KeyQuadruple {
        public,
        secret,
        relinearization,
        rotation,
    })
}

/// Summary of a generator's state, for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyGenerationSummary {
    pub scheme: SchemeId,
    pub security_level: u32,
    pub description: String,
    pub public_key_generated: bool,
    pub secret_key_generated: bool,
    pub relin_keys_generated: bool,
    pub galois_keys_generated: bool,
    pub timestamp: DateTime<Utc>,
}

/// Stateful generator: one context at a time, fresh keys per call.
pub struct KeyMaterialGenerator<S: EntropySource = OsEntropy> {
    source: S,
    context: Option<Context>,
    generations: u64,
}

impl KeyMaterialGenerator<OsEntropy> {
    /// Generator backed by the operating system CSPRNG.
    pub fn new() -> Self {
        Self::with_source(OsEntropy)
    }
}

impl Default for KeyMaterialGenerator<OsEntropy> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EntropySource> KeyMaterialGenerator<S> {
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            context: None,
            generations: 0,
        }
    }

    /// Initializes (or replaces) the context from a textual scheme identifier.
    ///
    /// An unknown identifier leaves any existing context untouched.
    pub fn initialize_context(&mut self, scheme: &str) -> CryptoResult<&Context> {
        let context = initialize_context(scheme)?;
        Ok(self.install(context))
    }

    /// Initializes (or replaces) the context for a known scheme.
    pub fn initialize_context_for(&mut self, scheme: SchemeId) -> &Context {
        self.install(Context::new(scheme))
    }

    fn install(&mut self, context: Context) -> &Context {
        debug!("initialized {} context", context.scheme());
        self.generations = 0;
        self.context.insert(context)
    }

    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    /// Generates a fresh key quadruple under the current context.
    pub fn generate_keys(&mut self) -> CryptoResult<KeyQuadruple> {
        let context = self
            .context
            .as_ref()
            .ok_or(CryptoError::ContextNotInitialized)?;
        let keys = generate_keys(context, &self.source)?;
        self.generations += 1;
        Ok(keys)
    }

    /// Summarizes the current context and whether keys have been produced.
    pub fn summary(&self) -> CryptoResult<KeyGenerationSummary> {
        let context = self
            .context
            .as_ref()
            .ok_or(CryptoError::ContextNotInitialized)?;
        let generated = self.generations > 0;
        Ok(KeyGenerationSummary {
            scheme: context.scheme(),
            security_level: context.params().security_level_bits(),
            description: context.params().description().to_string(),
            public_key_generated: generated,
            secret_key_generated: generated,
            relin_keys_generated: generated,
            galois_keys_generated: generated,
            timestamp: Utc::now(),
        })
    }
}

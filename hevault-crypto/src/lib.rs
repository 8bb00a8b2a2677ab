//! Key material and envelope codec for hevault.
//!
//! Simulates a homomorphic-encryption workflow for three schemes:
//! - an additive scheme (Paillier-style, addition only)
//! - an approximate real-number scheme (CKKS-style)
//! - an exact-integer scheme (BFV-style)
//!
//! # Architecture
//!
//! The crate is built leaf-first:
//!
//! 1. **Entropy**: one buffer of OS randomness per generation event.
//! 2. **Scheme catalog**: static parameter sets for each scheme.
//! 3. **Key generation**: the random buffer is carved into four disjoint
//!    segments (public, secret, relinearization, rotation).
//! 4. **Key format**: the secret key is rendered to text for export and
//!    parsed back into a [`KeyHandle`] on re-import.
//! 5. **Envelope**: plaintext is sealed under the public key into a
//!    self-describing [`Envelope`] and opened with the secret handle.
//!
//! The envelope is a reversible structural encoding, not a semantically
//! secure cipher, and no lattice arithmetic is performed.

pub mod entropy;
pub mod envelope;
mod error;
pub mod key_format;
pub mod keygen;
pub mod scheme;

pub use entropy::{EntropySource, OsEntropy};
pub use envelope::{Envelope, PlaintextUnit, decode, decode_text, encode};
pub use error::{CryptoError, CryptoResult};
pub use key_format::{KeyHandle, PAYLOAD_LINE_THRESHOLD, parse_secret, render_public, render_secret};
pub use keygen::{
    Context, FINGERPRINT_LEN, KeyArtifact, KeyGenerationSummary, KeyMaterialGenerator,
    KeyQuadruple, KeyRole, generate_keys, initialize_context,
};
pub use scheme::{SchemeCatalog, SchemeId, SchemeParameters};

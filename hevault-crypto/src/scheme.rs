//! Scheme identifiers and the static parameter catalog.
//!
//! Three parameter profiles are supported:
//! - **Additive**: partially homomorphic, addition only (Paillier-style).
//! - **Approximate**: real-number arithmetic over a polynomial ring (CKKS-style).
//! - **Exact integer**: integer arithmetic over a polynomial ring (BFV-style).
//!
//! The catalog is pure data and never mutated.

use crate::error::{CryptoError, CryptoResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declared security level shared by every scheme.
pub const SECURITY_LEVEL_BITS: u32 = 128;

/// Coefficient modulus chain (bit sizes) for both polynomial schemes.
pub const MODULUS_CHAIN: [u32; 4] = [60, 40, 40, 60];

/// Ring degree for both polynomial schemes.
pub const RING_DEGREE: usize = 8192;

/// Fixed-point scale of the approximate scheme, 2^40.
pub const APPROXIMATE_SCALE: u64 = 1 << 40;

/// Plain modulus of the exact-integer scheme.
pub const PLAIN_MODULUS: u64 = 1_032_193;

/// Key size of the additive scheme.
pub const ADDITIVE_KEY_SIZE_BITS: u32 = 2048;

const POLYNOMIAL_SEGMENT_LEN: usize = 1024;
const ADDITIVE_SEGMENT_LEN: usize = 512;

/// Closed set of supported schemes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemeId {
    #[serde(rename = "additive", alias = "paillier")]
    Additive,
    #[serde(rename = "approximate", alias = "ckks")]
    Approximate,
    #[serde(rename = "exact-integer", alias = "bfv")]
    ExactInteger,
}

impl SchemeId {
    pub const ALL: [SchemeId; 3] = [
        SchemeId::Additive,
        SchemeId::Approximate,
        SchemeId::ExactInteger,
    ];

    /// Canonical identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            SchemeId::Additive => "additive",
            SchemeId::Approximate => "approximate",
            SchemeId::ExactInteger => "exact-integer",
        }
    }

    /// Upper-case label used in rendered key blocks and export file names.
    pub fn block_label(self) -> &'static str {
        match self {
            SchemeId::Additive => "PAILLIER",
            SchemeId::Approximate => "CKKS",
            SchemeId::ExactInteger => "BFV",
        }
    }

    /// Resolves a block label (`CKKS`, `BFV`, `PAILLIER`) back to a scheme.
    pub fn from_block_label(label: &str) -> Option<Self> {
        SchemeId::ALL
            .into_iter()
            .find(|id| id.block_label().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for SchemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemeId {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "additive" | "paillier" => Ok(SchemeId::Additive),
            "approximate" | "ckks" => Ok(SchemeId::Approximate),
            "exact-integer" | "bfv" => Ok(SchemeId::ExactInteger),
            _ => Err(CryptoError::UnknownScheme(s.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdditiveParams {
    pub key_size_bits: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ApproximateParams {
    pub ring_degree: usize,
    pub modulus_chain: &'static [u32],
    pub scale: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExactIntegerParams {
    pub ring_degree: usize,
    pub modulus_chain: &'static [u32],
    pub plain_modulus: u64,
}

/// Parameter set of one scheme, tagged by scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemeParameters {
    Additive(AdditiveParams),
    Approximate(ApproximateParams),
    ExactInteger(ExactIntegerParams),
}

impl SchemeParameters {
    pub fn scheme_id(&self) -> SchemeId {
        match self {
            SchemeParameters::Additive(_) => SchemeId::Additive,
            SchemeParameters::Approximate(_) => SchemeId::Approximate,
            SchemeParameters::ExactInteger(_) => SchemeId::ExactInteger,
        }
    }

    pub fn security_level_bits(&self) -> u32 {
        SECURITY_LEVEL_BITS
    }

    pub fn description(&self) -> &'static str {
        match self {
            SchemeParameters::Additive(_) => "Partially Homomorphic (Addition only)",
            SchemeParameters::Approximate(_) => "Approximate FHE (Real numbers, ML/AI)",
            SchemeParameters::ExactInteger(_) => "Fully Homomorphic (Integer operations)",
        }
    }

    pub fn ring_degree(&self) -> Option<usize> {
        match self {
            SchemeParameters::Additive(_) => None,
            SchemeParameters::Approximate(p) => Some(p.ring_degree),
            SchemeParameters::ExactInteger(p) => Some(p.ring_degree),
        }
    }

    pub fn modulus_chain(&self) -> Option<&'static [u32]> {
        match self {
            SchemeParameters::Additive(_) => None,
            SchemeParameters::Approximate(p) => Some(p.modulus_chain),
            SchemeParameters::ExactInteger(p) => Some(p.modulus_chain),
        }
    }

    /// Fixed-point scale; only the approximate scheme has one.
    pub fn scale(&self) -> Option<u64> {
        match self {
            SchemeParameters::Approximate(p) => Some(p.scale),
            _ => None,
        }
    }

    pub fn plain_modulus(&self) -> Option<u64> {
        match self {
            SchemeParameters::ExactInteger(p) => Some(p.plain_modulus),
            _ => None,
        }
    }

    pub fn key_size_bits(&self) -> Option<u32> {
        match self {
            SchemeParameters::Additive(p) => Some(p.key_size_bits),
            _ => None,
        }
    }

    /// Length of the random buffer drawn per generation event.
    ///
    /// The nominal size (ring degree or key size) is taken as a byte count.
    pub fn key_material_len(&self) -> usize {
        match self {
            SchemeParameters::Additive(p) => p.key_size_bits as usize,
            SchemeParameters::Approximate(p) => p.ring_degree,
            SchemeParameters::ExactInteger(p) => p.ring_degree,
        }
    }

    /// Length of each of the four artifact segments.
    pub fn segment_len(&self) -> usize {
        match self {
            SchemeParameters::Additive(_) => ADDITIVE_SEGMENT_LEN,
            SchemeParameters::Approximate(_) | SchemeParameters::ExactInteger(_) => {
                POLYNOMIAL_SEGMENT_LEN
            }
        }
    }
}

const ADDITIVE: SchemeParameters = SchemeParameters::Additive(AdditiveParams {
    key_size_bits: ADDITIVE_KEY_SIZE_BITS,
});

const APPROXIMATE: SchemeParameters = SchemeParameters::Approximate(ApproximateParams {
    ring_degree: RING_DEGREE,
    modulus_chain: &MODULUS_CHAIN,
    scale: APPROXIMATE_SCALE,
});

const EXACT_INTEGER: SchemeParameters = SchemeParameters::ExactInteger(ExactIntegerParams {
    ring_degree: RING_DEGREE,
    modulus_chain: &MODULUS_CHAIN,
    plain_modulus: PLAIN_MODULUS,
});

/// Read-only table of scheme parameters.
pub struct SchemeCatalog;

impl SchemeCatalog {
    /// Returns the parameter set for a scheme.
    pub fn lookup(id: SchemeId) -> SchemeParameters {
        match id {
            SchemeId::Additive => ADDITIVE,
            SchemeId::Approximate => APPROXIMATE,
            SchemeId::ExactInteger => EXACT_INTEGER,
        }
    }

    /// Looks up a scheme by its textual identifier.
    pub fn lookup_str(id: &str) -> CryptoResult<SchemeParameters> {
        let id: SchemeId = id.parse()?;
        Ok(Self::lookup(id))
    }

    /// All parameter sets, in catalog order.
    pub fn all() -> [SchemeParameters; 3] {
        [ADDITIVE, APPROXIMATE, EXACT_INTEGER]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_fit_inside_key_material() {
        for params in SchemeCatalog::all() {
            assert!(4 * params.segment_len() <= params.key_material_len());
        }
    }

    #[test]
    fn block_label_roundtrip() {
        for id in SchemeId::ALL {
            assert_eq!(SchemeId::from_block_label(id.block_label()), Some(id));
        }
        assert_eq!(SchemeId::from_block_label("RSA"), None);
    }
}

//! Secure random material for key generation.
//!
//! Every key quadruple is carved from a single buffer drawn here. The default
//! source reads the operating system CSPRNG. A failed read is fatal and is
//! never retried or replaced with a weaker generator.

use crate::error::{CryptoError, CryptoResult};
use rand::TryRngCore;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

/// A source of cryptographically secure random bytes.
pub trait EntropySource {
    /// Returns a freshly filled buffer of exactly `size` bytes.
    fn generate(&self, size: usize) -> CryptoResult<Zeroizing<Vec<u8>>>;
}

/// Operating system CSPRNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn generate(&self, size: usize) -> CryptoResult<Zeroizing<Vec<u8>>> {
        if size == 0 {
            return Err(CryptoError::InvalidParameter(
                "random buffer size must be positive".to_string(),
            ));
        }

        let mut buf = Zeroizing::new(vec![0u8; size]);
        OsRng
            .try_fill_bytes(buf.as_mut_slice())
            .map_err(|e| CryptoError::EntropySourceUnavailable(e.to_string()))?;
        Ok(buf)
    }
}

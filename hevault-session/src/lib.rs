//! Session pipelines for hevault.
//!
//! Provides:
//! - Paced encryption and decryption sessions with cancellation
//! - Upload validation and export naming
//! - Gzip envelope export and import

pub mod config;
pub mod error;
pub mod export;
pub mod intake;
pub mod pacing;
pub mod session;

pub use config::SessionConfig;
pub use error::{SessionError, SessionResult};
pub use pacing::{PacerHandle, Progress, Step, StepPacer};
pub use session::{DecryptionOutcome, DecryptionSession, EncryptionResult, EncryptionSession};

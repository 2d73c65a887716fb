//! Error types for the service facade.
//!
//! Three failure classes with distinct handling policies:
//! - configuration errors are fatal and surface at construction only
//! - authorization denials are expected, generic, and never retried
//! - store faults are possibly transient; match creation retries once
//!
//! Decryption failures are not errors at all - the cipher layer recovers
//! them silently and they only appear as diagnostics.

use thiserror::Error;
use veilmatch_core::StoreError;

use crate::config::ConfigError;

/// Errors from service operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Fatal configuration problem (missing or unusable server secret)
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Relationship state insufficient for the requested access.
    ///
    /// Deliberately carries no detail: the message must not reveal whether
    /// the target identity exists or how the viewer relates to it.
    #[error("access denied")]
    Unauthorized,

    /// Fault in the backing store
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// Returns true if this error may succeed on retry.
    ///
    /// Store faults are possibly transient. Denials are policy, not
    /// faults - retrying an access-control failure is never correct.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

//! Veilmatch service facade.
//!
//! The exposed operation surface of the matching core: pseudonym
//! resolution, swipe recording with idempotent match creation, photo and
//! profile access decisions, and per-conversation encryption. This crate
//! is the "glue" layer - it wires the pure logic in [`veilmatch_core`] and
//! [`veilmatch_crypto`] to real collaborators (a store, a cache, the OS
//! RNG, the wall clock) and carries the tracing diagnostics.
//!
//! # Architecture
//!
//! All operations are stateless request handlers. The store is the only
//! source of truth; the identity cache is droppable memoization; keys are
//! derived per operation and never persisted. Transport, session
//! authentication, and media byte delivery live outside this crate - the
//! facade consumes an authenticated [`veilmatch_core::RealIdentity`] and
//! returns decisions and payloads.
//!
//! # Error policy
//!
//! - Missing server secret: fatal [`ConfigError`] at construction
//! - Insufficient relationship: generic [`ServiceError::Unauthorized`],
//!   never retried, never revealing target existence
//! - Store fault during match creation: retried exactly once against the
//!   same idempotent pair key
//! - Decryption miss: silently recovered, diagnostic log only

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod error;
mod service;

pub use config::{ConfigError, SECRET_ENV_VAR, ServiceConfig};
pub use error::ServiceError;
pub use service::{MatchService, SwipeOutcome};

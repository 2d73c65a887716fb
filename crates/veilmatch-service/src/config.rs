//! Service configuration.
//!
//! The only configuration this core needs is the server secret keying the
//! identity pseudonym transform. A missing secret is fatal at construction
//! time: silently degrading to an unkeyed hash would break every issued
//! pseudonym and leak the mapping structure.

use thiserror::Error;
use veilmatch_crypto::{SecretError, ServerSecret};

/// Environment variable holding the server secret.
pub const SECRET_ENV_VAR: &str = "VEILMATCH_SERVER_SECRET";

/// Fatal configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The server secret is not configured at all
    #[error("server secret is not configured (set {SECRET_ENV_VAR})")]
    MissingSecret,

    /// The configured secret is unusable
    #[error("invalid server secret: {0}")]
    InvalidSecret(#[from] SecretError),
}

/// Configuration for a [`crate::MatchService`].
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    secret: ServerSecret,
}

impl ServiceConfig {
    /// Build a configuration from explicit secret material.
    pub fn new(secret_material: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        Ok(Self { secret: ServerSecret::new(secret_material)? })
    }

    /// Build a configuration from the process environment.
    ///
    /// Reads [`SECRET_ENV_VAR`]; absence is [`ConfigError::MissingSecret`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let material = std::env::var(SECRET_ENV_VAR).map_err(|_| ConfigError::MissingSecret)?;
        Self::new(material.into_bytes())
    }

    /// The configured server secret.
    pub fn secret(&self) -> &ServerSecret {
        &self.secret
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_secret_accepted() {
        let config = ServiceConfig::new(b"some_secret_material".to_vec()).unwrap();
        assert_eq!(config.secret().as_bytes(), b"some_secret_material");
    }

    #[test]
    fn empty_secret_rejected() {
        assert_eq!(
            ServiceConfig::new(Vec::new()).map(|_| ()),
            Err(ConfigError::InvalidSecret(SecretError::Empty))
        );
    }

    #[test]
    fn error_message_names_the_env_var() {
        // Operators hit MissingSecret first; the message must say what to set
        assert!(ConfigError::MissingSecret.to_string().contains(SECRET_ENV_VAR));
    }
}

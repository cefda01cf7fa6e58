//! Authentication gate.
//!
//! Note commands only run once a bearer token is available. Whether the
//! token is valid is up to the backend, which answers `401` otherwise.

use std::path::Path;

use anyhow::Result;
use thiserror::Error;

use crate::config::Config;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Not signed in: run `fnotes login --token <token>` or set FOOD_NOTES_TOKEN")]
    SignedOut,
}

/// A signed-in session.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    token: String,
}

impl Credentials {
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Let the caller through only if a token is configured.
pub fn require(config: &Config) -> Result<Credentials, AuthError> {
    config
        .token
        .as_ref()
        .filter(|token| !token.trim().is_empty())
        .map(|token| Credentials {
            token: token.clone(),
        })
        .ok_or(AuthError::SignedOut)
}

/// Store `token` in the config file at `path`.
pub fn sign_in(path: &Path, token: &str) -> Result<()> {
    let mut config = Config::read(path)?;
    config.token = Some(token.trim().to_string());
    config.save(path)?;
    tracing::info!(path = %path.display(), "signed in");
    Ok(())
}

/// Remove the stored token. Returns whether one was present.
pub fn sign_out(path: &Path) -> Result<bool> {
    let mut config = Config::read(path)?;
    let was_signed_in = config.token.take().is_some();
    if was_signed_in {
        config.save(path)?;
        tracing::info!(path = %path.display(), "signed out");
    }
    Ok(was_signed_in)
}

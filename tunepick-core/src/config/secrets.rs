//! Secrets configuration loaded from environment variables only.
//!
//! This module handles sensitive configuration like bot tokens that should
//! never be stored in files. All secrets are read from environment variables.

use std::env;

/// Secrets loaded exclusively from environment variables.
///
/// These are sensitive values that should never be written to disk
/// or committed to version control.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    /// Discord bot token (env: DISCORD_BOT_TOKEN)
    pub discord_bot_token: Option<String>,

    /// Cookie forwarded to the catalog API (env: TUNEPICK_CATALOG_COOKIE)
    pub catalog_cookie: Option<String>,
}

/// Errors that can occur when loading secrets
#[derive(Debug, thiserror::Error)]
pub enum SecretsError {
    #[error("Missing required secret: {0}")]
    MissingSecret(String),
}

impl Secrets {
    /// Load secrets from environment variables.
    ///
    /// This function also loads .env file if present (for development),
    /// but production should rely on actual environment variables.
    pub fn from_env() -> Result<Self, SecretsError> {
        let _ = dotenvy::dotenv();

        Self::from_env_inner()
    }

    /// Internal method to load from environment without loading .env
    pub(crate) fn from_env_inner() -> Result<Self, SecretsError> {
        Ok(Self {
            discord_bot_token: non_empty_var("DISCORD_BOT_TOKEN"),
            catalog_cookie: non_empty_var("TUNEPICK_CATALOG_COOKIE"),
        })
    }

    /// Return the Discord token or a `MissingSecret` error.
    pub fn require_discord_token(&self) -> Result<&str, SecretsError> {
        self.discord_bot_token
            .as_deref()
            .ok_or_else(|| SecretsError::MissingSecret("DISCORD_BOT_TOKEN".to_string()))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

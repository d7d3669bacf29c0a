//! Configuration management for tunepick.
//!
//! This module provides a unified configuration system that separates
//! secrets (from environment variables) from settings (from TOML files).
//!
//! # Configuration Sources
//!
//! ## Secrets (Environment Variables)
//! - `DISCORD_BOT_TOKEN` - Discord bot token
//! - `TUNEPICK_CATALOG_COOKIE` - optional cookie for the catalog API
//!
//! ## Settings (TOML File)
//! Located at `~/.config/tunepick/config.toml`:
//! ```toml
//! [discord]
//! enabled = true
//!
//! [catalog]
//! base_url = "http://127.0.0.1:3000"
//! search_limit = 10
//!
//! [session]
//! ttl_seconds = 60
//! scope = "user"
//!
//! [logging]
//! level = "info"
//! ```

mod secrets;
mod settings;

pub use secrets::{Secrets, SecretsError};
pub use settings::{
    CatalogSettings, CommandSettings, DiscordSettings, FetchSettings, LoggingSettings,
    PresentationSettings, ScopeMode, SessionSettings, Settings, SettingsError,
};

/// Combined configuration containing both secrets and settings.
#[derive(Debug, Clone)]
pub struct Config {
    /// Secrets loaded from environment variables
    pub secrets: Secrets,
    /// Settings loaded from TOML configuration file
    pub settings: Settings,
}

/// Errors that can occur when loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Secrets error: {0}")]
    Secrets(#[from] SecretsError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Session TTL must be greater than zero")]
    ZeroSessionTtl,

    #[error("Search result limit must be greater than zero")]
    ZeroSearchLimit,

    #[error("At least one search command prefix is required")]
    NoSearchPrefix,
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The TOML file cannot be read or parsed
    /// - Discord is enabled but `DISCORD_BOT_TOKEN` is missing
    /// - A session or search knob is out of range
    pub fn load() -> Result<Self, ConfigError> {
        let secrets = Secrets::from_env()?;
        let settings = Settings::load()?;
        let config = Self { secrets, settings };
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.settings.discord.enabled {
            self.secrets.require_discord_token()?;
        }
        if self.settings.session.ttl_seconds == 0 {
            return Err(ConfigError::ZeroSessionTtl);
        }
        if self.settings.catalog.search_limit == 0 {
            return Err(ConfigError::ZeroSearchLimit);
        }
        if !self
            .settings
            .commands
            .search_prefixes
            .iter()
            .any(|prefix| !prefix.trim().is_empty())
        {
            return Err(ConfigError::NoSearchPrefix);
        }
        Ok(())
    }

    /// Get the Discord bot token (if configured).
    pub fn discord_bot_token(&self) -> Option<&str> {
        self.secrets.discord_bot_token.as_deref()
    }

    /// Get the catalog cookie (if configured).
    pub fn catalog_cookie(&self) -> Option<&str> {
        self.secrets.catalog_cookie.as_deref()
    }

    /// Check if Discord bot is enabled and has a token.
    pub fn discord_enabled(&self) -> bool {
        self.settings.discord.enabled && self.secrets.discord_bot_token.is_some()
    }
}

//! Settings configuration loaded from TOML files.
//!
//! This module handles non-sensitive configuration stored in TOML format
//! in the XDG config directory (~/.config/tunepick/config.toml).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Default TOML configuration file content
const DEFAULT_CONFIG_TOML: &str = r#"# tunepick configuration file
# Located at: ~/.config/tunepick/config.toml
#
# This file contains non-sensitive configuration.
# Secrets are loaded from environment variables:
#   - DISCORD_BOT_TOKEN
#   - TUNEPICK_CATALOG_COOKIE (optional)

[discord]
enabled = true

[logging]
level = "info"

[catalog]
base_url = "http://127.0.0.1:3000"
search_limit = 10
search_timeout_seconds = 10
resolve_timeout_seconds = 10

[fetch]
timeout_seconds = 60
# Discord's upload limit for unboosted servers
max_bytes = 10485760
# temp_dir = "/var/tmp/tunepick"

[session]
ttl_seconds = 60
# "user": one session per sender and group
# "channel": one shared session per group, only the searcher may pick
scope = "user"
reply_no_session = false
reply_not_originator = true

[commands]
search_prefixes = ["/song", "song"]

[presentation]
image_list = true
"#;

/// Settings loaded from TOML configuration file.
///
/// These are non-sensitive configuration values that can be safely
/// stored in files and version controlled (excluding secrets).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    /// Discord bot configuration
    #[serde(default)]
    pub discord: DiscordSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Catalog API configuration
    #[serde(default)]
    pub catalog: CatalogSettings,

    /// Media download configuration
    #[serde(default)]
    pub fetch: FetchSettings,

    /// Search session configuration
    #[serde(default)]
    pub session: SessionSettings,

    /// Chat command configuration
    #[serde(default)]
    pub commands: CommandSettings,

    /// Result list rendering
    #[serde(default)]
    pub presentation: PresentationSettings,
}

/// Discord bot settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DiscordSettings {
    /// Whether Discord bot is enabled
    #[serde(default)]
    pub enabled: bool,
}

/// Logging settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Catalog API settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogSettings {
    /// Base URL of the catalog API
    #[serde(default = "default_catalog_base_url")]
    pub base_url: String,

    /// Maximum number of tracks returned by a search
    #[serde(default = "default_catalog_search_limit")]
    pub search_limit: usize,

    /// Search request timeout in seconds
    #[serde(default = "default_catalog_search_timeout_seconds")]
    pub search_timeout_seconds: u64,

    /// URL resolution timeout in seconds
    #[serde(default = "default_catalog_resolve_timeout_seconds")]
    pub resolve_timeout_seconds: u64,
}

/// Media download settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchSettings {
    /// Whole-transfer deadline in seconds
    #[serde(default = "default_fetch_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Largest accepted download in bytes
    #[serde(default = "default_fetch_max_bytes")]
    pub max_bytes: u64,

    /// Directory for transient audio files (system temp dir if unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<String>,
}

/// Search session settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionSettings {
    /// How long a result list stays selectable, in seconds
    #[serde(default = "default_session_ttl_seconds")]
    pub ttl_seconds: u64,

    /// How conversation scopes are keyed
    #[serde(
        default,
        deserialize_with = "deserialize_scope_mode",
        serialize_with = "serialize_scope_mode"
    )]
    pub scope: ScopeMode,

    /// Reply when an ordinal arrives without a live session
    #[serde(default)]
    pub reply_no_session: bool,

    /// Reply when someone other than the searcher picks from a shared list
    #[serde(default = "default_true")]
    pub reply_not_originator: bool,
}

/// How a conversation scope is derived from an inbound message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScopeMode {
    /// One session per sender within a group (or per private chat)
    #[default]
    User,
    /// One session per group, shared by all members
    Channel,
}

impl ScopeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeMode::User => "user",
            ScopeMode::Channel => "channel",
        }
    }
}

impl std::fmt::Display for ScopeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ScopeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" | "sender" => Ok(ScopeMode::User),
            "channel" | "group" | "shared" => Ok(ScopeMode::Channel),
            _ => Err(format!("Unknown session scope: {}", s)),
        }
    }
}

/// Chat command settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommandSettings {
    /// Prefixes that turn a message into a catalog search
    #[serde(default = "default_search_prefixes")]
    pub search_prefixes: Vec<String>,
}

/// Result list rendering settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PresentationSettings {
    /// Send the result list as a PNG table (falls back to text on failure)
    #[serde(default = "default_true")]
    pub image_list: bool,
}

// Default value functions

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_catalog_base_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_catalog_search_limit() -> usize {
    10
}

fn default_catalog_search_timeout_seconds() -> u64 {
    10
}

fn default_catalog_resolve_timeout_seconds() -> u64 {
    10
}

fn default_fetch_timeout_seconds() -> u64 {
    60
}

fn default_fetch_max_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_session_ttl_seconds() -> u64 {
    60
}

fn default_search_prefixes() -> Vec<String> {
    vec!["/song".to_string(), "song".to_string()]
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: default_catalog_base_url(),
            search_limit: default_catalog_search_limit(),
            search_timeout_seconds: default_catalog_search_timeout_seconds(),
            resolve_timeout_seconds: default_catalog_resolve_timeout_seconds(),
        }
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: default_fetch_timeout_seconds(),
            max_bytes: default_fetch_max_bytes(),
            temp_dir: None,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl_seconds: default_session_ttl_seconds(),
            scope: ScopeMode::default(),
            reply_no_session: false,
            reply_not_originator: true,
        }
    }
}

impl Default for CommandSettings {
    fn default() -> Self {
        Self {
            search_prefixes: default_search_prefixes(),
        }
    }
}

impl Default for PresentationSettings {
    fn default() -> Self {
        Self { image_list: true }
    }
}

impl CatalogSettings {
    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_seconds)
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_secs(self.resolve_timeout_seconds)
    }
}

impl FetchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Resolve the artifact directory, defaulting to the system temp dir.
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir)
    }
}

impl SessionSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

fn deserialize_scope_mode<'de, D>(deserializer: D) -> Result<ScopeMode, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    value.parse().map_err(serde::de::Error::custom)
}

fn serialize_scope_mode<S>(scope: &ScopeMode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(scope.as_str())
}

/// Errors that can occur when loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    ConfigDirNotFound,
}

impl Settings {
    /// Load settings from the TOML configuration file.
    ///
    /// If the config file doesn't exist, creates it with default values.
    /// The file is located at `~/.config/tunepick/config.toml`.
    pub fn load() -> Result<Self, SettingsError> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            tracing::info!("Creating default configuration at {:?}", config_path);
            Self::create_default_config(&config_path)?;
        }

        let content = fs::read_to_string(&config_path)?;
        Self::from_toml(&content)
    }

    /// Parse settings from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(content)?;
        Ok(settings)
    }

    /// Serialize settings to TOML content.
    pub fn to_toml(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get the configuration file path.
    ///
    /// Uses XDG config directory: `~/.config/tunepick/config.toml`
    pub fn config_path() -> Result<PathBuf, SettingsError> {
        if let Ok(override_dir) = std::env::var("TUNEPICK_CONFIG_DIR") {
            let dir = PathBuf::from(override_dir);
            return Ok(dir.join("config.toml"));
        }

        let config_dir = dirs::config_dir()
            .ok_or(SettingsError::ConfigDirNotFound)?
            .join("tunepick");

        Ok(config_dir.join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, DEFAULT_CONFIG_TOML)?;

        Ok(())
    }

    /// Save settings to a specific file path.
    pub fn save_to_path(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = self.to_toml()?;
        fs::write(path, content)?;
        Ok(())
    }
}

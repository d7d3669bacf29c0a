pub mod config;
pub mod track;

// Config re-exports
pub use config::{
    CatalogSettings, CommandSettings, Config, ConfigError, FetchSettings, PresentationSettings,
    ScopeMode, Secrets, SecretsError, SessionSettings, Settings, SettingsError,
};

pub use track::Track;

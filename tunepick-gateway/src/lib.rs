pub mod catalog;
pub mod deterministic_messages;
pub mod discord;
pub mod media;
pub mod presentation;
pub mod selection;

pub use catalog::{CatalogClient, CatalogError, NeteaseCatalogClient};
pub use media::{Artifact, FetchError, HttpMediaFetcher, MediaFetcher};
pub use selection::{
    Command, DeliveryError, EngineOptions, Outbound, Outcome, ScopeKey, SelectionEngine,
    SelectionError, SessionStore,
};

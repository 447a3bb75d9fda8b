//! # WebMap
//!
//! A map-engine-agnostic web mapping core.
//!
//! Application code talks to [`WebMap`]; rendering engines plug in through a
//! [`MapAdapter`] and the [`LayerAdapter`]s it registers. The [`ngw`] module
//! resolves NextGIS Web resources into layer adapters asynchronously.

pub mod core;
pub mod data;
pub mod input;
pub mod layers;
pub mod ngw;
pub mod plugins;
pub mod prelude;
pub mod ui;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    adapter::MapAdapter,
    builder::WebMapBuilder,
    config::{FitOptions, MapOptions},
    geo::{LngLat, LngLatBounds},
    headless::HeadlessMapAdapter,
    layer_ops::LayerDef,
    map::{WeakWebMap, WebMap},
};

pub use layers::{
    base::{AdapterKind, LayerAdapter, LayerHandle, LayerOptions, VectorLayerAdapter},
    factory::{AdapterFactory, AdapterRef, LayerAdapterFactory},
};

pub use input::events::{InteractionEvent, LayerEvent, PositionEvent, StatusEvent};

pub use plugins::base::{LayerAdapterProvider, StarterKit};

pub use data::{geojson::GeoJson, paint::Paint};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, WebMapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum WebMapError {
    #[error("No adapter: {0}")]
    AdapterNotFound(String),

    #[error("No id for layer: {0}")]
    MissingLayerId(String),

    #[error("Layer {id} could not be added: {reason}")]
    LayerAdd { id: String, reason: String },

    #[error("Starter kit {kit} failed: {reason}")]
    StarterKit { kit: String, reason: String },

    #[error("Map adapter error: {0}")]
    MapAdapter(String),

    #[error("Map is not created")]
    MapNotCreated,

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Connector error: {0}")]
    Connector(#[from] ngw::connector::ConnectorError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error type alias for convenience
pub type Error = WebMapError;

/// Initializes `env_logger` from the `RUST_LOG` environment variable.
///
/// Safe to call more than once.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

//! Prelude module for common webmap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use webmap::prelude::*;`

pub use crate::core::{
    adapter::{LayerOrder, MapAdapter, NativeControl, NativeHandle, NativeLayer, NativeMap},
    builder::WebMapBuilder,
    config::{FitOptions, MapOptions},
    geo::{LngLat, LngLatBounds},
    headless::HeadlessMapAdapter,
    layer_ops::LayerDef,
    map::{ControlRef, WeakWebMap, WebMap},
};

pub use crate::layers::{
    base::{
        AdapterKind, DataLayerFilter, EventHandled, LayerAdapter, LayerHandle, LayerOptions,
        VectorLayerAdapter,
    },
    factory::{AdapterFactory, AdapterRef, AdapterRegistry, FnAdapterFactory, LayerAdapterFactory},
};

pub use crate::data::{
    geojson::{GeoJson, GeoJsonFeature, GeoJsonGeometry, VectorLayerType},
    paint::{Paint, PaintSpec, PaintType},
};

pub use crate::input::{
    events::{InteractionEvent, LayerClickEvent, LayerEvent, PositionEvent, StatusEvent},
    handler::{EventManager, ListenerId},
};

pub use crate::ui::controls::{ControlKind, ControlPosition, MapControl};

pub use crate::plugins::base::{LayerAdapterProvider, StarterKit};

pub use crate::ngw::{
    kit::{NgwKit, NgwKitOptions},
    resolver::NgwLayerOptions,
};

pub use crate::{Result, WebMapError};

pub use std::sync::Arc;

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};

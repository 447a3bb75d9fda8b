use crate::{
    core::{adapter::NativeLayer, geo::LngLatBounds},
    data::{
        geojson::{GeoJson, GeoJsonFeature, VectorLayerType},
        paint::PaintSpec,
    },
    input::events::LayerClickEvent,
    prelude::Arc,
    Result,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::str::FromStr;

/// Kind of layer adapter, the key of the adapter registry.
///
/// Engines register factories for the well-known kinds; starter kits add
/// further kinds under custom names (e.g. `NGW:WEBMAP`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AdapterKind {
    Tile,
    Image,
    GeoJson,
    Marker,
    Custom(String),
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterKind::Tile => write!(f, "TILE"),
            AdapterKind::Image => write!(f, "IMAGE"),
            AdapterKind::GeoJson => write!(f, "GEOJSON"),
            AdapterKind::Marker => write!(f, "MARKER"),
            AdapterKind::Custom(name) => write!(f, "{}", name),
        }
    }
}

impl FromStr for AdapterKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.to_ascii_uppercase().as_str() {
            "TILE" => AdapterKind::Tile,
            "IMAGE" => AdapterKind::Image,
            "GEOJSON" => AdapterKind::GeoJson,
            "MARKER" => AdapterKind::Marker,
            _ => AdapterKind::Custom(s.to_string()),
        })
    }
}

/// Whether an optional adapter hook took care of the operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventHandled {
    Handled,
    NotHandled,
}

/// Predicate over the features of a vector layer
pub type DataLayerFilter = Arc<dyn Fn(&GeoJsonFeature) -> bool + Send + Sync>;

/// Callback invoked by vector adapters when a feature is clicked
pub type LayerClickCallback = Arc<dyn Fn(&LayerClickEvent) + Send + Sync>;

/// Configuration bag handed to a layer adapter.
///
/// Common fields are typed; engine specific settings go to `extra`.
#[derive(Clone, Default)]
pub struct LayerOptions {
    pub id: Option<String>,
    pub order: Option<i32>,
    pub visibility: Option<bool>,
    pub base_layer: bool,
    pub attribution: Option<String>,
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
    pub opacity: Option<f32>,
    /// Fit the view to the layer extent once it is added
    pub fit: bool,
    pub url: Option<String>,
    /// Query parameters for server-rendered layers
    pub params: Vec<(String, String)>,
    pub data: Option<GeoJson>,
    pub layer_type: Option<VectorLayerType>,
    pub paint: Option<PaintSpec>,
    pub selected_paint: Option<PaintSpec>,
    pub selectable: bool,
    pub multiselect: Option<bool>,
    pub unselect_on_second_click: Option<bool>,
    pub filter: Option<DataLayerFilter>,
    pub on_layer_click: Option<LayerClickCallback>,
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl LayerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_visibility(mut self, visibility: bool) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn as_base_layer(mut self) -> Self {
        self.base_layer = true;
        self
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    pub fn with_param(mut self, key: &str, value: impl ToString) -> Self {
        self.params.retain(|(k, _)| k != key);
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_data(mut self, data: GeoJson) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_attribution(mut self, attribution: &str) -> Self {
        self.attribution = Some(attribution.to_string());
        self
    }

    pub fn with_paint(mut self, paint: impl Into<PaintSpec>) -> Self {
        self.paint = Some(paint.into());
        self
    }

    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&GeoJsonFeature) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn with_fit(mut self, fit: bool) -> Self {
        self.fit = fit;
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Debug for LayerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerOptions")
            .field("id", &self.id)
            .field("order", &self.order)
            .field("visibility", &self.visibility)
            .field("base_layer", &self.base_layer)
            .field("attribution", &self.attribution)
            .field("min_zoom", &self.min_zoom)
            .field("max_zoom", &self.max_zoom)
            .field("url", &self.url)
            .field("params", &self.params)
            .field("has_data", &self.data.is_some())
            .field("has_filter", &self.filter.is_some())
            .finish_non_exhaustive()
    }
}

/// Engine side of a layer.
///
/// Implementations hold engine resources behind interior mutability; the map
/// owns the adapter through a [`LayerEntry`]. Every hook except `add_layer`
/// is optional: `NotHandled` makes the map fall back to the map adapter.
#[async_trait]
pub trait LayerAdapter: Send + Sync {
    /// Creates the native layer. Called once the map is ready.
    async fn add_layer(&self, options: &LayerOptions) -> Result<NativeLayer>;

    async fn extent(&self) -> Option<LngLatBounds> {
        None
    }

    /// Vector capability, for adapters that hold features
    fn vector(&self) -> Option<&dyn VectorLayerAdapter> {
        None
    }

    fn before_remove(&self) {}

    fn remove_layer(&self, _layer: &NativeLayer) -> EventHandled {
        EventHandled::NotHandled
    }

    fn show_layer(&self, _layer: &NativeLayer) -> EventHandled {
        EventHandled::NotHandled
    }

    fn hide_layer(&self, _layer: &NativeLayer) -> EventHandled {
        EventHandled::NotHandled
    }

    fn as_any(&self) -> &dyn Any;
}

/// Optional vector operations. Unimplemented operations report `NotHandled`.
pub trait VectorLayerAdapter: Send + Sync {
    fn select(&self, _filter: Option<&DataLayerFilter>) -> EventHandled {
        EventHandled::NotHandled
    }

    fn unselect(&self, _filter: Option<&DataLayerFilter>) -> EventHandled {
        EventHandled::NotHandled
    }

    fn filter(&self, _filter: &DataLayerFilter) -> EventHandled {
        EventHandled::NotHandled
    }

    fn remove_filter(&self) -> EventHandled {
        EventHandled::NotHandled
    }

    fn set_data(&self, _data: &GeoJson) -> EventHandled {
        EventHandled::NotHandled
    }

    fn add_data(&self, _data: &GeoJson) -> EventHandled {
        EventHandled::NotHandled
    }

    fn clear_layer(&self, _predicate: Option<&DataLayerFilter>) -> EventHandled {
        EventHandled::NotHandled
    }
}

#[derive(Debug, Clone)]
struct LayerState {
    order: i32,
    options: LayerOptions,
    native: Option<NativeLayer>,
}

/// A layer registered on a map: its identity, stacking order, options and
/// the adapter that owns the native layer.
pub struct LayerEntry {
    id: String,
    kind: AdapterKind,
    adapter: Box<dyn LayerAdapter>,
    state: RwLock<LayerState>,
}

/// Shared handle to a registered layer
pub type LayerHandle = Arc<LayerEntry>;

impl LayerEntry {
    pub fn new(
        id: String,
        kind: AdapterKind,
        order: i32,
        options: LayerOptions,
        adapter: Box<dyn LayerAdapter>,
    ) -> Self {
        Self {
            id,
            kind,
            adapter,
            state: RwLock::new(LayerState {
                order,
                options,
                native: None,
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &AdapterKind {
        &self.kind
    }

    pub fn order(&self) -> i32 {
        self.state.read().order
    }

    /// Snapshot of the current options
    pub fn options(&self) -> LayerOptions {
        self.state.read().options.clone()
    }

    pub fn is_visible(&self) -> bool {
        self.state.read().options.visibility.unwrap_or(false)
    }

    pub fn is_base_layer(&self) -> bool {
        self.state.read().options.base_layer
    }

    pub fn attribution(&self) -> Option<String> {
        self.state.read().options.attribution.clone()
    }

    /// The native layer, once the adapter created it
    pub fn native(&self) -> Option<NativeLayer> {
        self.state.read().native.clone()
    }

    pub fn adapter(&self) -> &dyn LayerAdapter {
        self.adapter.as_ref()
    }

    /// Downcasts the adapter to a concrete type
    pub fn adapter_as<T: Any>(&self) -> Option<&T> {
        self.adapter.as_any().downcast_ref::<T>()
    }

    pub(crate) fn set_visibility(&self, visibility: bool) {
        self.state.write().options.visibility = Some(visibility);
    }

    pub(crate) fn set_native(&self, native: NativeLayer) {
        self.state.write().native = Some(native);
    }
}

impl fmt::Debug for LayerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("LayerEntry")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("order", &state.order)
            .field("visibility", &state.options.visibility)
            .field("native", &state.native)
            .finish()
    }
}

//! The map adapter contract.
//!
//! A map adapter bridges the core to one rendering engine. The core only ever
//! talks to this trait; it never knows which engine sits behind it.

use crate::{
    core::{
        config::{FitOptions, MapOptions},
        geo::{LngLat, LngLatBounds},
    },
    input::events::MapAdapterEvents,
    layers::factory::AdapterFactory,
    ui::controls::{ControlKind, ControlOptions, ControlPosition, CreateControlOptions, MapControl},
    Result,
};
use async_trait::async_trait;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Opaque handle to an engine-native object (map, layer or control).
///
/// Cloning is cheap and clones compare equal with [`NativeHandle::same`].
#[derive(Clone)]
pub struct NativeHandle(Arc<dyn Any + Send + Sync>);

impl NativeHandle {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Whether both handles point at the same native object
    pub fn same(&self, other: &NativeHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeHandle({:p})", Arc::as_ptr(&self.0))
    }
}

pub type NativeMap = NativeHandle;
pub type NativeLayer = NativeHandle;
pub type NativeControl = NativeHandle;

/// Stacking position of one registered layer, handed to
/// [`MapAdapter::set_layer_order`] so engines can compute relative z-indices.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerOrder {
    pub id: String,
    pub order: i32,
}

#[async_trait]
pub trait MapAdapter: Send + Sync {
    /// Creates the native map. Must emit `create` on [`MapAdapter::events`].
    async fn create(&self, options: &MapOptions) -> Result<()>;

    /// The native map, once created
    fn map(&self) -> Option<NativeMap>;

    /// Whether the native map finished loading its style/resources
    fn is_loaded(&self) -> bool {
        true
    }

    fn events(&self) -> &MapAdapterEvents;

    /// Layer adapters this engine ships with
    fn layer_adapters(&self) -> Vec<AdapterFactory>;

    fn set_center(&self, center: LngLat);
    fn get_center(&self) -> Option<LngLat>;
    fn set_zoom(&self, zoom: f64);
    fn get_zoom(&self) -> Option<f64>;

    fn set_view(&self, center: LngLat, zoom: f64) {
        self.set_center(center);
        self.set_zoom(zoom);
    }

    fn fit(&self, bounds: LngLatBounds, options: &FitOptions);

    fn set_cursor(&self, _cursor: &str) {}

    fn show_layer(&self, layer: &NativeLayer);
    fn hide_layer(&self, layer: &NativeLayer);
    fn remove_layer(&self, layer: &NativeLayer);
    fn set_layer_order(&self, layer: &NativeLayer, order: i32, layers: &[LayerOrder]);

    fn set_layer_opacity(&self, _layer: &NativeLayer, _opacity: f32) {}

    /// Builds an engine control out of a universal control description
    fn create_control(
        &self,
        _control: Arc<dyn MapControl>,
        _options: &CreateControlOptions,
    ) -> Option<NativeControl> {
        None
    }

    /// Instantiates one of the engine's built-in controls
    fn control_adapter(
        &self,
        _kind: &ControlKind,
        _options: &ControlOptions,
    ) -> Option<NativeControl> {
        None
    }

    fn add_control(&self, control: &NativeControl, position: ControlPosition)
        -> Option<NativeControl>;

    fn remove_control(&self, control: &NativeControl);
}

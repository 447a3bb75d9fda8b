use crate::{
    core::{
        adapter::{NativeHandle, NativeLayer},
        geo::{LngLat, LngLatBounds},
    },
    layers::base::{LayerAdapter, LayerOptions},
    Result, WebMapError,
};
use async_trait::async_trait;
use parking_lot::Mutex;

/// Native marker of the headless engine
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: LngLat,
    pub popup: Option<String>,
}

impl Marker {
    /// Reads `position` (`[lng, lat]`) and `popup` from the extra options
    pub fn from_options(options: &LayerOptions) -> Result<Self> {
        let position = options
            .extra
            .get("position")
            .cloned()
            .ok_or_else(|| WebMapError::InvalidOptions("marker requires a position".into()))?;
        let position: LngLat = serde_json::from_value(position)?;

        Ok(Self {
            position,
            popup: options
                .extra
                .get("popup")
                .and_then(|v| v.as_str())
                .map(str::to_string),
        })
    }
}

/// Marker layer adapter of the headless engine
#[derive(Default)]
pub struct MarkerAdapter {
    marker: Mutex<Option<Marker>>,
}

impl MarkerAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marker(&self) -> Option<Marker> {
        self.marker.lock().clone()
    }
}

#[async_trait]
impl LayerAdapter for MarkerAdapter {
    async fn add_layer(&self, options: &LayerOptions) -> Result<NativeLayer> {
        let marker = Marker::from_options(options)?;
        *self.marker.lock() = Some(marker.clone());
        Ok(NativeHandle::new(marker))
    }

    async fn extent(&self) -> Option<LngLatBounds> {
        self.marker
            .lock()
            .as_ref()
            .map(|m| LngLatBounds::from_point(m.position))
    }

    crate::impl_layer_adapter_any!();
}

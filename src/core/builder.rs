//! Map builder for fluent API configuration
//!
//! `WebMapBuilder` gathers the map adapter, the map options and the starter
//! kits, then builds a [`WebMap`] and optionally creates it.

use crate::{
    core::{
        adapter::MapAdapter,
        config::MapOptions,
        geo::{LngLat, LngLatBounds},
        headless::HeadlessMapAdapter,
        map::WebMap,
    },
    data::paint::Paint,
    plugins::base::StarterKit,
    prelude::Arc,
    Result,
};

/// Builder for creating and configuring WebMap instances
pub struct WebMapBuilder {
    /// Engine bridge; the headless engine when unset
    map_adapter: Option<Arc<dyn MapAdapter>>,
    options: MapOptions,
    starter_kits: Vec<Arc<dyn StarterKit>>,
}

impl Default for WebMapBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WebMapBuilder {
    pub fn new() -> Self {
        Self {
            map_adapter: None,
            options: MapOptions::default(),
            starter_kits: Vec::new(),
        }
    }

    pub fn with_map_adapter(mut self, adapter: Arc<dyn MapAdapter>) -> Self {
        self.map_adapter = Some(adapter);
        self
    }

    /// Replace the whole map options
    pub fn with_options(mut self, options: MapOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_starter_kit(mut self, kit: Arc<dyn StarterKit>) -> Self {
        self.starter_kits.push(kit);
        self
    }

    pub fn with_target(mut self, target: &str) -> Self {
        self.options.target = Some(target.to_string());
        self
    }

    /// Set the initial center and zoom level
    pub fn with_center_and_zoom(mut self, center: LngLat, zoom: f64) -> Self {
        self.options.center = Some(center);
        self.options.zoom = Some(zoom);
        self
    }

    pub fn with_bounds(mut self, bounds: LngLatBounds) -> Self {
        self.options.bounds = Some(bounds);
        self
    }

    /// Set zoom limits
    pub fn with_zoom_limits(mut self, min_zoom: Option<f64>, max_zoom: Option<f64>) -> Self {
        self.options.min_zoom = min_zoom;
        self.options.max_zoom = max_zoom;
        self
    }

    /// Default paint of vector layers
    pub fn with_paint(mut self, paint: Paint) -> Self {
        self.options.paint = Some(paint);
        self
    }

    pub fn with_selected_paint(mut self, paint: Paint) -> Self {
        self.options.selected_paint = Some(paint);
        self
    }

    /// Build the map without creating the native map
    pub fn build(self) -> WebMap {
        let adapter = self
            .map_adapter
            .unwrap_or_else(|| Arc::new(HeadlessMapAdapter::new()));
        WebMap::new(adapter, self.options, self.starter_kits)
    }

    /// Build the map and wait for its creation
    pub async fn build_and_create(self) -> Result<WebMap> {
        let map = self.build();
        map.create().await?;
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::events::StatusEvent;

    #[test]
    fn test_builder_defaults_to_headless_engine() {
        let map = WebMapBuilder::new()
            .with_target("map")
            .with_zoom_limits(Some(3.0), None)
            .build();

        let options = map.options();
        assert_eq!(options.target.as_deref(), Some("map"));
        assert_eq!(options.min_zoom, Some(3.0));
        assert_eq!(options.max_zoom, Some(21.0));
        assert!(!map.get_event_status(StatusEvent::Create));
    }

    #[tokio::test]
    async fn test_build_and_create() {
        let map = WebMapBuilder::new()
            .with_center_and_zoom(LngLat::new(37.6, 55.7), 10.0)
            .build_and_create()
            .await
            .unwrap();

        assert!(map.get_event_status(StatusEvent::Create));
        assert_eq!(map.get_zoom(), Some(10.0));
    }
}

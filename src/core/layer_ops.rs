//! Layer registration, removal, queries and vector operations of [`WebMap`].

use crate::{
    core::{constants::BASE_LAYER_ORDER, map::WebMap},
    data::{
        geojson::{GeoJson, GeoJsonFeature, VectorLayerType},
        paint::{PaintSpec, PaintType},
    },
    input::events::{InteractionEvent, LayerClickEvent, LayerEvent},
    layers::{
        base::{DataLayerFilter, EventHandled, LayerEntry, LayerHandle, LayerOptions},
        factory::{AdapterFactory, AdapterRef},
    },
    prelude::Arc,
    Result, WebMapError,
};
use std::future::Future;

/// Reference to a registered layer: its id or its handle
#[derive(Debug, Clone)]
pub enum LayerDef {
    Id(String),
    Layer(LayerHandle),
}

impl From<&str> for LayerDef {
    fn from(id: &str) -> Self {
        LayerDef::Id(id.to_string())
    }
}

impl From<String> for LayerDef {
    fn from(id: String) -> Self {
        LayerDef::Id(id)
    }
}

impl From<&String> for LayerDef {
    fn from(id: &String) -> Self {
        LayerDef::Id(id.clone())
    }
}

impl From<LayerHandle> for LayerDef {
    fn from(layer: LayerHandle) -> Self {
        LayerDef::Layer(layer)
    }
}

impl From<&LayerHandle> for LayerDef {
    fn from(layer: &LayerHandle) -> Self {
        LayerDef::Layer(layer.clone())
    }
}

impl WebMap {
    /// Registers a layer through the given adapter.
    ///
    /// The layer is always constructed hidden; a requested visibility is
    /// applied afterwards through [`WebMap::show_layer`] so a single `show`
    /// event fires.
    pub async fn add_layer(
        &self,
        adapter: impl Into<AdapterRef>,
        options: LayerOptions,
    ) -> Result<LayerHandle> {
        self.add_layer_with_order(adapter, options, None).await
    }

    /// Like [`WebMap::add_layer`], with an explicit stacking order
    pub async fn add_layer_with_order(
        &self,
        adapter: impl Into<AdapterRef>,
        options: LayerOptions,
        order: Option<i32>,
    ) -> Result<LayerHandle> {
        let factory = self.resolve_adapter(adapter.into()).await?;
        let mut options = options;
        self.update_geojson_options(&mut options);

        let (id, order) = {
            let mut registry = self.inner.registry.lock();
            let order = match order.or(options.order) {
                Some(order) => order,
                None => registry.next_order(),
            };
            let id = options.id.clone().unwrap_or_else(|| order.to_string());
            let order = if options.base_layer {
                BASE_LAYER_ORDER
            } else {
                order
            };
            (id, order)
        };

        let defaults = self.options();
        options.id = Some(id.clone());
        options.order = Some(order);
        options.min_zoom = options.min_zoom.or(defaults.min_zoom);
        options.max_zoom = options.max_zoom.or(defaults.max_zoom);

        // Each layer starts hidden whatever its global visibility state
        let visibility = options.visibility.unwrap_or(false);
        options.visibility = Some(false);

        let native_map = self.inner.map_adapter.map();
        let adapter = factory.create(native_map.as_ref(), &options);
        let layer: LayerHandle = Arc::new(LayerEntry::new(
            id.clone(),
            factory.kind(),
            order,
            options.clone(),
            adapter,
        ));
        if self.inner.registry.lock().insert(layer.clone()).is_some() {
            log::warn!("layer {} replaces a registered layer", id);
        }

        self.inner.events.lifecycle.emit(&LayerEvent::PreAdd(layer.clone()));
        self.on_map_load().await;

        let native = match layer.adapter().add_layer(&options).await {
            Ok(native) => native,
            Err(e) => {
                self.inner.registry.lock().remove_entry(&layer);
                return Err(match e {
                    e @ WebMapError::LayerAdd { .. } => e,
                    e => WebMapError::LayerAdd {
                        id,
                        reason: e.to_string(),
                    },
                });
            }
        };
        layer.set_native(native);

        if let Some(filter) = &options.filter {
            self.filter_layer(&layer, filter.clone());
        }
        if options.base_layer {
            self.inner.registry.lock().push_base(&id);
        }

        // A toggle replayed while the native layer was pending left its
        // target in the visibility flag
        let visibility = visibility || layer.is_visible();
        if visibility {
            layer.set_visibility(false);
            self.show_layer(&layer);
        }

        if options.fit {
            if let Some(extent) = layer.adapter().extent().await {
                self.fit_bounds(extent, None);
            }
        }

        log::debug!("layer {} added with order {}", id, order);
        self.inner.events.lifecycle.emit(&LayerEvent::Add(layer.clone()));
        Ok(layer)
    }

    /// Adds a layer once an asynchronous adapter resolution completes.
    ///
    /// The stacking order is taken before waiting, so layers keep the order
    /// of the calls however their resolutions interleave. Fails with
    /// [`WebMapError::AdapterNotFound`] when the resolution yields no adapter.
    pub async fn add_layer_from_async_adapter<F>(
        &self,
        adapter: F,
        options: LayerOptions,
        order: Option<i32>,
    ) -> Result<LayerHandle>
    where
        F: Future<Output = Option<AdapterFactory>> + Send,
    {
        let order = order
            .or(options.order)
            .unwrap_or_else(|| self.inner.registry.lock().next_order());

        match adapter.await {
            Some(factory) => self.add_layer_with_order(factory, options, Some(order)).await,
            None => Err(WebMapError::AdapterNotFound(
                options.id.unwrap_or_else(|| order.to_string()),
            )),
        }
    }

    /// Shortcut for a base layer, pinned to order 0
    pub async fn add_base_layer(
        &self,
        adapter: impl Into<AdapterRef>,
        options: LayerOptions,
    ) -> Result<LayerHandle> {
        let mut options = options;
        options.base_layer = true;
        self.add_layer(adapter, options).await
    }

    /// Creates a vector layer from GeoJSON data and shows it.
    ///
    /// Without an explicit adapter the geometry type of the data decides the
    /// layer type and the paint type.
    pub async fn add_geojson_layer(
        &self,
        options: LayerOptions,
        adapter: Option<AdapterRef>,
    ) -> Result<LayerHandle> {
        let mut options = options;
        options.multiselect = options.multiselect.or(Some(false));
        options.unselect_on_second_click = options.unselect_on_second_click.or(Some(true));

        let adapter = match adapter {
            Some(adapter) => adapter,
            None => {
                update_geojson_adapter_options(&mut options);
                AdapterRef::from("GEOJSON")
            }
        };
        if options.paint.is_none() {
            options.paint = Some(PaintSpec::default());
        }

        let layer = self.add_layer(adapter, options).await?;
        self.show_layer(&layer);
        Ok(layer)
    }

    async fn resolve_adapter(&self, adapter: AdapterRef) -> Result<AdapterFactory> {
        match adapter {
            AdapterRef::Kind(kind) => self
                .get_layer_adapter(&kind)
                .ok_or_else(|| WebMapError::AdapterNotFound(kind.to_string())),
            AdapterRef::Factory(factory) => Ok(factory),
            AdapterRef::Pending(pending) => pending
                .await
                .ok_or_else(|| WebMapError::AdapterNotFound("pending resolution".to_string())),
        }
    }

    /// Wraps the click callback so the map republishes `layer:click`, and lays
    /// the layer paints over the map defaults.
    fn update_geojson_options(&self, options: &mut LayerOptions) {
        let caller_callback = options.on_layer_click.take();
        let weak = self.downgrade();
        options.on_layer_click = Some(Arc::new(move |event: &LayerClickEvent| {
            if let Some(callback) = &caller_callback {
                callback(event);
            }
            if let Some(map) = weak.upgrade() {
                map.inner
                    .events
                    .interaction
                    .emit(&InteractionEvent::LayerClick(event.clone()));
            }
        }));

        let defaults = self.options();
        if let Some(paint) = &defaults.paint {
            options.paint = Some(options.paint.take().unwrap_or_default().prepare(paint));
        }
        if let (Some(selected), Some(default_selected)) =
            (options.selected_paint.take(), &defaults.selected_paint)
        {
            options.selected_paint = Some(selected.prepare(default_selected));
        }
    }

    /// Removes a layer from the map and the registry. Unknown layers are ignored.
    pub fn remove_layer(&self, layer: impl Into<LayerDef>) {
        let layer = match self.get_layer(layer) {
            Some(layer) if self.is_registered(&layer) => layer,
            _ => return,
        };

        self.inner
            .events
            .lifecycle
            .emit(&LayerEvent::PreRemove(layer.clone()));

        let adapter = layer.adapter();
        adapter.before_remove();
        if let Some(native) = layer.native() {
            if adapter.remove_layer(&native) == EventHandled::NotHandled {
                self.inner.map_adapter.remove_layer(&native);
            }
        }

        self.inner.registry.lock().remove(layer.id());
        log::debug!("layer {} removed", layer.id());
        self.inner.events.lifecycle.emit(&LayerEvent::Remove(layer));
    }

    /// Removes every layer accepted by `allow` (all layers when `None`)
    pub fn remove_layers(&self, allow: Option<&dyn Fn(&str, &LayerHandle) -> bool>) {
        let handles = self.inner.registry.lock().handles();
        for layer in handles {
            if allow.map_or(true, |allow| allow(layer.id(), &layer)) {
                self.remove_layer(&layer);
            }
        }
    }

    /// Removes every layer except base layers
    pub fn remove_overlays(&self) {
        self.remove_layers(Some(&|_: &str, layer: &LayerHandle| !layer.is_base_layer()));
    }

    /// Registered layer for a definition. A handle is returned as is.
    pub fn get_layer(&self, layer: impl Into<LayerDef>) -> Option<LayerHandle> {
        match layer.into() {
            LayerDef::Id(id) => self.inner.registry.lock().get(&id),
            LayerDef::Layer(layer) => Some(layer),
        }
    }

    /// Id of a layer definition; fails for ids that name no layer
    pub fn get_layer_id(&self, layer: impl Into<LayerDef>) -> Result<String> {
        match layer.into() {
            LayerDef::Id(id) => match self.inner.registry.lock().get(&id) {
                Some(layer) => Ok(layer.id().to_string()),
                None => Err(WebMapError::MissingLayerId(id)),
            },
            LayerDef::Layer(layer) => Ok(layer.id().to_string()),
        }
    }

    /// Ids of all registered layers
    pub fn get_layers(&self) -> Vec<String> {
        self.inner.registry.lock().ids()
    }

    pub fn is_layer_visible(&self, layer: impl Into<LayerDef>) -> bool {
        self.get_layer(layer).map_or(false, |l| l.is_visible())
    }

    /// `None` when the definition names no layer
    pub fn is_base_layer(&self, layer: impl Into<LayerDef>) -> Option<bool> {
        let layer = self.get_layer(layer)?;
        Some(self.inner.registry.lock().is_base(layer.id()))
    }

    /// Ids of base layers, in insertion order
    pub fn get_base_layers(&self) -> Vec<String> {
        self.inner.registry.lock().base_layers().to_vec()
    }

    /// Ids of layers marked selected
    pub fn get_selected_layers(&self) -> Vec<String> {
        self.inner.registry.lock().selected_layers().to_vec()
    }

    /// Fits the view to the layer extent, when the layer has one
    pub async fn fit_layer(&self, layer: impl Into<LayerDef>) {
        if let Some(layer) = self.get_layer(layer) {
            if let Some(extent) = layer.adapter().extent().await {
                self.fit_bounds(extent, None);
            }
        }
    }

    pub fn set_layer_opacity(&self, layer: impl Into<LayerDef>, value: f32) {
        if let Some(native) = self.get_layer(layer).and_then(|l| l.native()) {
            self.inner
                .map_adapter
                .set_layer_opacity(&native, value.clamp(0.0, 1.0));
        }
    }

    /// Marks the layer selected, selecting the features accepted by `filter`
    pub fn select_layer(&self, layer: impl Into<LayerDef>, filter: Option<DataLayerFilter>) {
        if let Some(layer) = self.get_layer(layer) {
            if let Some(vector) = layer.adapter().vector() {
                vector.select(filter.as_ref());
            }
            self.inner.registry.lock().select(layer.id());
        }
    }

    pub fn unselect_layer(&self, layer: impl Into<LayerDef>, filter: Option<DataLayerFilter>) {
        if let Some(layer) = self.get_layer(layer) {
            if let Some(vector) = layer.adapter().vector() {
                vector.unselect(filter.as_ref());
            }
            self.inner.registry.lock().unselect(layer.id());
        }
    }

    /// Hides the features rejected by `filter`
    pub fn filter_layer(&self, layer: impl Into<LayerDef>, filter: DataLayerFilter) {
        if let Some(vector_layer) = self.get_layer(layer) {
            if let Some(vector) = vector_layer.adapter().vector() {
                vector.filter(&filter);
            }
        }
    }

    pub fn remove_layer_filter(&self, layer: impl Into<LayerDef>) {
        if let Some(layer) = self.get_layer(layer) {
            if let Some(vector) = layer.adapter().vector() {
                if vector.remove_filter() == EventHandled::NotHandled {
                    let accept_all: DataLayerFilter = Arc::new(|_: &GeoJsonFeature| true);
                    vector.filter(&accept_all);
                }
            }
        }
    }

    /// Replaces the layer data, falling back to clear + add
    pub fn set_layer_data(&self, layer: impl Into<LayerDef>, data: &GeoJson) {
        if let Some(layer) = self.get_layer(layer) {
            if let Some(vector) = layer.adapter().vector() {
                if vector.set_data(data) == EventHandled::NotHandled {
                    vector.clear_layer(None);
                    vector.add_data(data);
                }
            }
        }
    }

    pub fn add_layer_data(&self, layer: impl Into<LayerDef>, data: &GeoJson) {
        if let Some(layer) = self.get_layer(layer) {
            if let Some(vector) = layer.adapter().vector() {
                vector.add_data(data);
            }
        }
    }

    /// Removes the features accepted by `predicate`, all features when `None`
    pub fn clear_layer_data(&self, layer: impl Into<LayerDef>, predicate: Option<DataLayerFilter>) {
        if let Some(layer) = self.get_layer(layer) {
            if let Some(vector) = layer.adapter().vector() {
                vector.clear_layer(predicate.as_ref());
            }
        }
    }

    fn is_registered(&self, layer: &LayerHandle) -> bool {
        self.inner
            .registry
            .lock()
            .get(layer.id())
            .map_or(false, |current| Arc::ptr_eq(&current, layer))
    }
}

/// Derives the layer type from the data and completes a static paint's type
fn update_geojson_adapter_options(options: &mut LayerOptions) {
    let layer_type = match options
        .data
        .as_ref()
        .and_then(|d| d.detect_geometry_kind())
        .and_then(|k| k.layer_type())
    {
        Some(layer_type) => layer_type,
        None => return,
    };

    if let Some(paint) = options.paint.as_mut().and_then(|p| p.as_static_mut()) {
        if paint.paint_type.is_none() {
            paint.paint_type = Some(match layer_type {
                VectorLayerType::Fill | VectorLayerType::Line => PaintType::Path,
                _ if paint.is_icon() => PaintType::Icon,
                VectorLayerType::Circle => PaintType::Circle,
            });
        }
    }
    options.layer_type = Some(layer_type);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{config::MapOptions, headless::HeadlessMapAdapter},
        data::{
            geojson::{GeoJsonFeature, GeoJsonGeometry},
            paint::Paint,
        },
        layers::{base::AdapterKind, vector::GeoJsonAdapter},
    };
    use assert_matches::assert_matches;
    use parking_lot::Mutex;

    async fn created_map() -> (WebMap, Arc<HeadlessMapAdapter>) {
        let adapter = Arc::new(HeadlessMapAdapter::new());
        let map = WebMap::new(adapter.clone(), MapOptions::default(), vec![]);
        map.create().await.unwrap();
        (map, adapter)
    }

    fn tile(id: &str) -> LayerOptions {
        LayerOptions::new().with_id(id).with_url("https://tile/{z}/{x}/{y}.png")
    }

    fn lines() -> GeoJson {
        GeoJson::collection(vec![GeoJsonFeature::new(GeoJsonGeometry::LineString {
            coordinates: vec![[0.0, 0.0], [1.0, 1.0]],
        })])
    }

    #[tokio::test]
    async fn test_auto_ids_and_orders() {
        let (map, _) = created_map().await;
        let url = LayerOptions::new().with_url("{z}/{x}/{y}");

        let first = map.add_layer("TILE", url.clone()).await.unwrap();
        let second = map.add_layer("TILE", url.clone()).await.unwrap();
        let explicit = map
            .add_layer_with_order("TILE", url.clone(), Some(0))
            .await
            .unwrap();
        let third = map.add_layer("TILE", url).await.unwrap();

        assert_eq!((first.id(), first.order()), ("1", 1));
        assert_eq!((second.id(), second.order()), ("2", 2));
        assert_eq!((explicit.id(), explicit.order()), ("0", 0));
        assert_eq!((third.id(), third.order()), ("3", 3));
    }

    #[tokio::test]
    async fn test_layer_options_inherit_zoom_range() {
        let (map, _) = created_map().await;
        let mut options = tile("osm");
        options.max_zoom = Some(12.0);
        let layer = map.add_layer("TILE", options).await.unwrap();

        let options = layer.options();
        assert_eq!(options.min_zoom, Some(0.0));
        assert_eq!(options.max_zoom, Some(12.0));
    }

    #[tokio::test]
    async fn test_unknown_adapter_leaves_registry_untouched() {
        let (map, _) = created_map().await;
        let events = Arc::new(Mutex::new(0));
        let counter = events.clone();
        map.events().lifecycle.on(move |_| *counter.lock() += 1);

        let err = map.add_layer("WMS", tile("wms")).await.unwrap_err();

        assert_matches!(err, WebMapError::AdapterNotFound(name) if name == "WMS");
        assert!(map.get_layers().is_empty());
        assert_eq!(*events.lock(), 0);
    }

    #[tokio::test]
    async fn test_failed_native_add_is_rolled_back() {
        let (map, _) = created_map().await;
        let err = map
            .add_layer("TILE", LayerOptions::new().with_id("broken"))
            .await
            .unwrap_err();

        assert_matches!(err, WebMapError::LayerAdd { id, .. } if id == "broken");
        assert!(map.get_layer("broken").is_none());
    }

    #[tokio::test]
    async fn test_preadd_fires_before_native_add() {
        let (map, adapter) = created_map().await;
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        map.events().lifecycle.on(move |event| {
            log.lock()
                .push((event.name(), event.layer().native().is_some()));
        });

        map.add_layer("TILE", tile("osm")).await.unwrap();

        assert_eq!(
            *seen.lock(),
            vec![("layer:preadd", false), ("layer:add", true)]
        );
        assert_eq!(adapter.shown_count(), 0);
    }

    #[tokio::test]
    async fn test_visible_layer_is_shown_once() {
        let (map, adapter) = created_map().await;
        let shows = Arc::new(Mutex::new(0));
        let counter = shows.clone();
        map.events().lifecycle.on(move |event| {
            if let LayerEvent::Show(_) = event {
                *counter.lock() += 1;
            }
        });

        let layer = map
            .add_layer("TILE", tile("osm").with_visibility(true))
            .await
            .unwrap();

        assert!(map.is_layer_visible(&layer));
        assert_eq!(*shows.lock(), 1);
        assert!(adapter.is_shown(&layer.native().unwrap()));
        assert_eq!(adapter.shown_count(), 1);
    }

    #[tokio::test]
    async fn test_add_remove_round_trip() {
        let (map, adapter) = created_map().await;
        map.add_layer("TILE", tile("keep")).await.unwrap();
        let before = map.get_layers();

        map.add_layer("TILE", tile("temp")).await.unwrap();
        map.remove_layer("temp");

        assert_eq!(map.get_layers(), before);
        assert_eq!(adapter.removed_count(), 1);
        map.remove_layer("missing");
    }

    #[tokio::test]
    async fn test_base_layer_removal_purges_first_entry() {
        let (map, _) = created_map().await;
        let base = map
            .add_base_layer("TILE", tile("osm").with_visibility(true))
            .await
            .unwrap();
        map.add_base_layer("TILE", tile("sat")).await.unwrap();

        assert_eq!(base.order(), 0);
        assert_eq!(map.get_base_layers(), vec!["osm", "sat"]);
        assert_eq!(map.is_base_layer("osm"), Some(true));

        map.remove_layer("osm");
        assert_eq!(map.get_base_layers(), vec!["sat"]);
        assert_eq!(map.is_base_layer("osm"), None);
    }

    #[tokio::test]
    async fn test_remove_overlays_keeps_base_layers() {
        let (map, _) = created_map().await;
        map.add_base_layer("TILE", tile("osm")).await.unwrap();
        map.add_layer("TILE", tile("a")).await.unwrap();
        map.add_layer("TILE", tile("b")).await.unwrap();

        map.remove_overlays();
        assert_eq!(map.get_layers(), vec!["osm".to_string()]);

        map.remove_layers(None);
        assert!(map.get_layers().is_empty());
    }

    #[tokio::test]
    async fn test_missing_layer_id() {
        let (map, _) = created_map().await;
        assert_matches!(map.get_layer_id("nope"), Err(WebMapError::MissingLayerId(_)));
    }

    #[tokio::test]
    async fn test_geojson_layer_gets_paint_and_layer_click() {
        let (map, _) = created_map().await;
        let clicks = Arc::new(Mutex::new(Vec::new()));
        let log = clicks.clone();
        map.events().interaction.on(move |event| log.lock().push(event.name()));

        let mut options = LayerOptions::new()
            .with_id("roads")
            .with_data(lines())
            .with_paint(Paint::color("red"));
        options.selectable = true;
        let layer = map.add_geojson_layer(options, None).await.unwrap();

        assert!(map.is_layer_visible("roads"));
        let options = layer.options();
        assert_eq!(options.layer_type, Some(VectorLayerType::Line));
        let paint = options.paint.unwrap();
        let paint = paint.as_static().unwrap();
        assert_eq!(paint.paint_type, Some(PaintType::Path));
        assert_eq!(paint.color.as_deref(), Some("red"));
        assert_eq!(paint.radius, Some(8.0));

        let adapter = layer.adapter_as::<GeoJsonAdapter>().unwrap();
        assert!(adapter.click(0).unwrap().selected);
        assert_eq!(*clicks.lock(), vec!["layer:click"]);
    }

    #[tokio::test]
    async fn test_vector_operations_reach_adapter() {
        let (map, _) = created_map().await;
        let data = GeoJson::collection(vec![
            GeoJsonFeature::new(GeoJsonGeometry::Point { coordinates: [0.0, 0.0] }).with_id(1),
            GeoJsonFeature::new(GeoJsonGeometry::Point { coordinates: [5.0, 5.0] }).with_id(2),
        ]);
        let layer = map
            .add_layer("GEOJSON", LayerOptions::new().with_id("pts").with_data(data.clone()))
            .await
            .unwrap();
        let adapter = layer.adapter_as::<GeoJsonAdapter>().unwrap();

        let first: DataLayerFilter =
            Arc::new(|f: &GeoJsonFeature| f.id == Some(serde_json::json!(1)));
        map.select_layer("pts", Some(first.clone()));
        assert_eq!(map.get_selected_layers(), vec!["pts"]);
        assert_eq!(adapter.selected_features().len(), 1);
        map.unselect_layer("pts", None);
        assert!(map.get_selected_layers().is_empty());

        map.filter_layer("pts", first.clone());
        assert_eq!(adapter.features().len(), 1);
        map.remove_layer_filter("pts");
        assert_eq!(adapter.features().len(), 2);

        map.add_layer_data("pts", &data);
        assert_eq!(adapter.feature_count(), 4);
        map.clear_layer_data("pts", Some(first));
        assert_eq!(adapter.feature_count(), 2);
        map.set_layer_data("pts", &lines());
        assert_eq!(adapter.feature_count(), 1);
    }

    #[tokio::test]
    async fn test_filter_option_applied_after_add() {
        let (map, _) = created_map().await;
        let data = GeoJson::collection(vec![
            GeoJsonFeature::new(GeoJsonGeometry::Point { coordinates: [0.0, 0.0] }).with_id(1),
            GeoJsonFeature::new(GeoJsonGeometry::Point { coordinates: [5.0, 5.0] }).with_id(2),
        ]);
        let options = LayerOptions::new()
            .with_data(data)
            .with_filter(|f| f.id == Some(serde_json::json!(2)));
        let layer = map.add_layer("GEOJSON", options).await.unwrap();

        let adapter = layer.adapter_as::<GeoJsonAdapter>().unwrap();
        assert_eq!(adapter.features().len(), 1);
        assert_eq!(layer.kind(), &AdapterKind::GeoJson);
    }

    #[tokio::test]
    async fn test_fit_option_fits_view_to_extent() {
        let (map, adapter) = created_map().await;
        let data = GeoJson::collection(vec![
            GeoJsonFeature::new(GeoJsonGeometry::Point { coordinates: [10.0, 10.0] }),
            GeoJsonFeature::new(GeoJsonGeometry::Point { coordinates: [20.0, 30.0] }),
        ]);
        map.add_layer("GEOJSON", LayerOptions::new().with_data(data).with_fit(true))
            .await
            .unwrap();

        let fit = adapter.last_fit().unwrap();
        assert_eq!((fit.west, fit.south, fit.east, fit.north), (10.0, 10.0, 20.0, 30.0));
    }

    #[tokio::test]
    async fn test_async_adapter_resolving_to_none() {
        let (map, _) = created_map().await;
        let err = map
            .add_layer_from_async_adapter(async { None }, tile("none"), None)
            .await
            .unwrap_err();

        assert_matches!(err, WebMapError::AdapterNotFound(id) if id == "none");
        assert!(map.get_layers().is_empty());
    }

    #[tokio::test]
    async fn test_async_adds_keep_call_order() {
        let (map, _) = created_map().await;
        let factory = map.get_layer_adapter(&AdapterKind::Tile).unwrap();
        let url = LayerOptions::new().with_url("{z}/{x}/{y}");

        let slow_factory = factory.clone();
        let slow = async move {
            tokio::task::yield_now().await;
            Some(slow_factory)
        };
        let fast = async move { Some(factory) };

        let (first, second) = futures::join!(
            map.add_layer_from_async_adapter(slow, url.clone(), None),
            map.add_layer_from_async_adapter(fast, url, None),
        );
        let (first, second) = (first.unwrap(), second.unwrap());

        assert_eq!((first.id(), first.order()), ("1", 1));
        assert_eq!((second.id(), second.order()), ("2", 2));
    }

    #[tokio::test]
    async fn test_colliding_id_replaces_registry_entry() {
        let (map, adapter) = created_map().await;
        let old = map.add_layer("TILE", tile("a")).await.unwrap();
        let new = map.add_layer("TILE", tile("a")).await.unwrap();

        assert_eq!(map.get_layers(), vec!["a".to_string()]);
        assert!(Arc::ptr_eq(&map.get_layer("a").unwrap(), &new));
        assert_eq!(adapter.removed_count(), 0);

        map.remove_layer(&old);
        assert!(Arc::ptr_eq(&map.get_layer("a").unwrap(), &new));
        assert_eq!(adapter.removed_count(), 0);
    }
}

//! The `WebMap` façade.
//!
//! `WebMap` is a cheap, clonable handle over shared map state. It owns the
//! map adapter, the layer adapter registry and the layer registry, and it
//! republishes the adapter's events on its own typed channels. Layer
//! operations live in `layer_ops`, visibility in `visibility`.

use crate::{
    core::{
        adapter::{MapAdapter, NativeControl},
        config::{FitOptions, MapOptions},
        geo::{LngLat, LngLatBounds},
    },
    input::{
        events::{InteractionEvent, StatusEvent, WebMapEvents},
        handler::StatusEvents,
    },
    layers::{
        base::AdapterKind,
        factory::{AdapterFactory, AdapterRegistry},
        manager::LayerRegistry,
    },
    plugins::base::StarterKit,
    prelude::Arc,
    ui::controls::{ControlKind, ControlOptions, ControlPosition, CreateControlOptions, MapControl},
    Result, WebMapError,
};
use parking_lot::{Mutex, RwLock};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Weak,
};

/// Readiness of the native map, as reported by the map adapter's `create` event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum MapReadiness {
    Created,
}

pub(crate) struct WebMapInner {
    pub(crate) options: RwLock<MapOptions>,
    pub(crate) map_adapter: Arc<dyn MapAdapter>,
    pub(crate) adapters: RwLock<AdapterRegistry>,
    pub(crate) registry: Mutex<LayerRegistry>,
    pub(crate) events: WebMapEvents,
    pub(crate) starter_kits: Vec<Arc<dyn StarterKit>>,
    pub(crate) readiness: StatusEvents<MapReadiness>,
    /// Visibility requests issued before the native map existed
    pub(crate) pending_toggles: Mutex<Vec<(String, bool)>>,
    creating: AtomicBool,
}

/// Engine agnostic web map.
///
/// ```ignore
/// let map = WebMap::new(Arc::new(HeadlessMapAdapter::new()), MapOptions::default(), vec![]);
/// map.create().await?;
/// let layer = map.add_layer("TILE", LayerOptions::new().with_url(url)).await?;
/// map.show_layer(&layer);
/// ```
#[derive(Clone)]
pub struct WebMap {
    pub(crate) inner: Arc<WebMapInner>,
}

/// Non-owning handle, for adapters and kits that must not keep the map alive
#[derive(Clone)]
pub struct WeakWebMap {
    inner: Weak<WebMapInner>,
}

impl WeakWebMap {
    pub fn upgrade(&self) -> Option<WebMap> {
        self.inner.upgrade().map(|inner| WebMap { inner })
    }
}

impl WebMap {
    pub fn new(
        map_adapter: Arc<dyn MapAdapter>,
        options: MapOptions,
        starter_kits: Vec<Arc<dyn StarterKit>>,
    ) -> Self {
        let adapters = AdapterRegistry::from_factories(map_adapter.layer_adapters());
        let inner = Arc::new(WebMapInner {
            options: RwLock::new(MapOptions::default().merge(&options)),
            map_adapter,
            adapters: RwLock::new(adapters),
            registry: Mutex::new(LayerRegistry::new()),
            events: WebMapEvents::default(),
            starter_kits,
            readiness: StatusEvents::new(),
            pending_toggles: Mutex::new(Vec::new()),
            creating: AtomicBool::new(false),
        });

        let map = WebMap { inner };
        map.add_events_listeners();
        map
    }

    pub fn downgrade(&self) -> WeakWebMap {
        WeakWebMap {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Propagates the map adapter's events onto the web map channels
    fn add_events_listeners(&self) {
        let events = self.inner.map_adapter.events();

        let weak = Arc::downgrade(&self.inner);
        events.create.on(move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.readiness.emit(MapReadiness::Created);
                WebMap { inner }.replay_pending_toggles();
            }
        });

        let weak = Arc::downgrade(&self.inner);
        events.interaction.on(move |click| {
            if let Some(inner) = weak.upgrade() {
                inner
                    .events
                    .interaction
                    .emit(&InteractionEvent::Click(click.clone()));
            }
        });

        let weak = Arc::downgrade(&self.inner);
        events.position.on(move |position| {
            if let Some(inner) = weak.upgrade() {
                inner.events.position.emit(position);
            }
        });
    }

    /// Creates the native map and runs the starter kits.
    ///
    /// Idempotent: once `create` fired, later calls return immediately, and a
    /// call racing an ongoing creation waits for it.
    pub async fn create(&self) -> Result<()> {
        if self.get_event_status(StatusEvent::Create) {
            return Ok(());
        }
        if self.inner.creating.swap(true, Ordering::SeqCst) {
            self.on_load(StatusEvent::Create).await;
            return Ok(());
        }

        let result = self.setup_map().await;
        if result.is_err() {
            self.inner.creating.store(false, Ordering::SeqCst);
        }
        result?;

        self.inner.events.status.emit(StatusEvent::Create);
        log::debug!("web map created");
        Ok(())
    }

    /// Lays `options` over the current options, then creates the map
    pub async fn create_with(&self, options: &MapOptions) -> Result<()> {
        if !self.get_event_status(StatusEvent::Create) {
            let merged = self.inner.options.read().merge(options);
            *self.inner.options.write() = merged;
        }
        self.create().await
    }

    async fn setup_map(&self) -> Result<()> {
        let options = self.options();
        self.inner.map_adapter.create(&options).await?;
        self.zoom_to_initial_extent(&options);

        self.add_layer_providers().await?;
        self.on_load_sync().await;

        self.inner.events.status.emit(StatusEvent::BuildMap);
        Ok(())
    }

    fn zoom_to_initial_extent(&self, options: &MapOptions) {
        if let Some(bounds) = options.bounds {
            self.fit_bounds(bounds, None);
        } else {
            self.set_view(options.center, options.zoom);
        }
    }

    async fn add_layer_providers(&self) -> Result<()> {
        for kit in &self.inner.starter_kits {
            let providers = kit.layer_adapters().await.map_err(|e| WebMapError::StarterKit {
                kit: kit.name().to_string(),
                reason: e.to_string(),
            })?;

            for provider in providers {
                let factory = provider.create_adapter(self).await.map_err(|e| {
                    WebMapError::StarterKit {
                        kit: kit.name().to_string(),
                        reason: e.to_string(),
                    }
                })?;
                if let Some(factory) = factory {
                    log::debug!("starter kit {} registers {} adapter", kit.name(), provider.name());
                    self.inner
                        .adapters
                        .write()
                        .register_as(provider.name(), factory);
                }
            }
        }
        Ok(())
    }

    async fn on_load_sync(&self) {
        for kit in &self.inner.starter_kits {
            if let Err(e) = kit.on_load_sync(self).await {
                log::error!("starter kit {} failed on load: {}", kit.name(), e);
            }
        }
    }

    /// Whether a status event already fired
    pub fn get_event_status(&self, status: StatusEvent) -> bool {
        self.inner.events.status.status(status)
    }

    /// Resolves once `status` fired; immediately if it already has
    pub async fn on_load(&self, status: StatusEvent) {
        self.inner.events.status.wait_for(status).await
    }

    /// Resolves once the native map exists and finished loading
    pub(crate) async fn on_map_load(&self) {
        let adapter = &self.inner.map_adapter;
        if adapter.map().is_some() && adapter.is_loaded() {
            return;
        }
        self.inner.readiness.wait_for(MapReadiness::Created).await
    }

    pub(crate) fn is_map_created(&self) -> bool {
        self.inner.map_adapter.map().is_some()
            || self.inner.readiness.status(MapReadiness::Created)
    }

    pub fn events(&self) -> &WebMapEvents {
        &self.inner.events
    }

    pub fn map_adapter(&self) -> &Arc<dyn MapAdapter> {
        &self.inner.map_adapter
    }

    /// Snapshot of the current map options
    pub fn options(&self) -> MapOptions {
        self.inner.options.read().clone()
    }

    /// Registered layer adapter factories
    pub fn get_layer_adapters(&self) -> AdapterRegistry {
        self.inner.adapters.read().clone()
    }

    pub fn get_layer_adapter(&self, kind: &AdapterKind) -> Option<AdapterFactory> {
        self.inner.adapters.read().get(kind)
    }

    /// Registers an extra layer adapter factory under its own kind
    pub fn register_layer_adapter(&self, factory: AdapterFactory) {
        self.inner.adapters.write().register(factory);
    }

    pub fn set_cursor(&self, cursor: &str) {
        self.inner.map_adapter.set_cursor(cursor);
    }

    pub fn set_center(&self, center: LngLat) -> &Self {
        self.inner.map_adapter.set_center(center);
        self
    }

    pub fn get_center(&self) -> Option<LngLat> {
        self.inner.map_adapter.get_center()
    }

    pub fn set_zoom(&self, zoom: f64) -> &Self {
        self.inner.map_adapter.set_zoom(zoom);
        self
    }

    pub fn get_zoom(&self) -> Option<f64> {
        self.inner.map_adapter.get_zoom()
    }

    /// Sets center and zoom; either may be omitted
    pub fn set_view(&self, center: Option<LngLat>, zoom: Option<f64>) {
        match (center, zoom) {
            (Some(center), Some(zoom)) => self.inner.map_adapter.set_view(center, zoom),
            (Some(center), None) => self.inner.map_adapter.set_center(center),
            (None, Some(zoom)) => self.inner.map_adapter.set_zoom(zoom),
            (None, None) => {}
        }
    }

    pub fn fit_bounds(&self, bounds: LngLatBounds, options: Option<FitOptions>) -> &Self {
        self.inner
            .map_adapter
            .fit(bounds, &options.unwrap_or_default());
        self
    }

    /// Builds an engine control from a universal control, once the map is built
    pub async fn create_control(
        &self,
        control: Arc<dyn MapControl>,
        options: CreateControlOptions,
    ) -> Option<NativeControl> {
        self.on_load(StatusEvent::BuildMap).await;
        self.inner.map_adapter.create_control(control, &options)
    }

    /// Instantiates one of the engine's built-in controls
    pub fn get_control(&self, kind: &ControlKind, options: &ControlOptions) -> Option<NativeControl> {
        self.inner.map_adapter.control_adapter(kind, options)
    }

    /// Adds a built-in control by kind, or an already created control
    pub async fn add_control(
        &self,
        control: impl Into<ControlRef>,
        position: ControlPosition,
    ) -> Option<NativeControl> {
        self.on_load(StatusEvent::BuildMap).await;
        let control = match control.into() {
            ControlRef::Kind(kind, options) => self.get_control(&kind, &options)?,
            ControlRef::Native(native) => native,
        };
        self.inner.map_adapter.add_control(&control, position)
    }

    pub fn remove_control(&self, control: &NativeControl) {
        self.inner.map_adapter.remove_control(control);
    }

    /// Attributions of registered layers, in stacking order, without duplicates
    pub fn get_attributions(&self, only_visible: bool) -> Vec<String> {
        let handles = self.inner.registry.lock().handles();
        let mut attributions: Vec<String> = Vec::new();
        for layer in handles {
            if only_visible && !layer.is_visible() {
                continue;
            }
            if let Some(attribution) = layer.attribution() {
                if !attributions.contains(&attribution) {
                    attributions.push(attribution);
                }
            }
        }
        attributions
    }
}

/// Control argument of [`WebMap::add_control`]
#[derive(Debug, Clone)]
pub enum ControlRef {
    Kind(ControlKind, ControlOptions),
    Native(NativeControl),
}

impl From<ControlKind> for ControlRef {
    fn from(kind: ControlKind) -> Self {
        ControlRef::Kind(kind, ControlOptions::default())
    }
}

impl From<NativeControl> for ControlRef {
    fn from(native: NativeControl) -> Self {
        ControlRef::Native(native)
    }
}

impl From<&NativeControl> for ControlRef {
    fn from(native: &NativeControl) -> Self {
        ControlRef::Native(native.clone())
    }
}

//! In-memory map engine.
//!
//! `HeadlessMapAdapter` implements the full map adapter contract without any
//! rendering. It keeps the view, the native layers and the controls in memory
//! and records what the core asked of it, which makes it the engine of choice
//! for tests and command line tools.

use crate::{
    core::{
        adapter::{LayerOrder, MapAdapter, NativeControl, NativeHandle, NativeLayer, NativeMap},
        config::{FitOptions, MapOptions},
        constants::TILE_SIZE,
        geo::{LngLat, LngLatBounds},
    },
    input::{
        events::{MapAdapterEvents, MapClickEvent, Pixel, PositionEvent, ViewState},
        position::{MoveEdge, PositionTracker},
    },
    layers::{
        base::AdapterKind,
        factory::{AdapterFactory, FnAdapterFactory},
        image::ImageAdapter,
        marker::MarkerAdapter,
        tile::TileAdapter,
        vector::GeoJsonAdapter,
    },
    prelude::Arc,
    ui::controls::{ControlKind, ControlOptions, ControlPosition, CreateControlOptions, MapControl},
    Result,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::f64::consts::PI;

/// Native map object of the headless engine
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessMap {
    pub target: Option<String>,
    pub width: f64,
    pub height: f64,
}

/// Native control of the headless engine
pub struct HeadlessControl {
    pub name: String,
    /// Rendered content of a universal control
    pub content: Option<String>,
    control: Option<Arc<dyn MapControl>>,
}

#[derive(Default)]
struct HeadlessState {
    map: Option<NativeMap>,
    options: MapOptions,
    center: Option<LngLat>,
    zoom: Option<f64>,
    cursor: Option<String>,
    create_count: usize,
    visible: Vec<NativeLayer>,
    show_calls: usize,
    removed: Vec<NativeLayer>,
    orders: Vec<(NativeLayer, i32)>,
    opacities: Vec<(NativeLayer, f32)>,
    controls: Vec<(NativeControl, ControlPosition)>,
    last_fit: Option<LngLatBounds>,
    tracker: PositionTracker,
}

impl HeadlessState {
    fn view(&self) -> ViewState {
        ViewState {
            center: self.center,
            zoom: self.zoom,
        }
    }

    fn clamp_zoom(&self, zoom: f64) -> f64 {
        let min = self.options.min_zoom.unwrap_or(f64::MIN);
        let max = self.options.max_zoom.unwrap_or(f64::MAX);
        zoom.max(min).min(max)
    }
}

/// Map adapter with no rendering engine behind it
pub struct HeadlessMapAdapter {
    width: f64,
    height: f64,
    events: MapAdapterEvents,
    state: Mutex<HeadlessState>,
}

impl Default for HeadlessMapAdapter {
    fn default() -> Self {
        Self::with_size(800.0, 600.0)
    }
}

impl HeadlessMapAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adapter with a container of the given pixel size, used by `fit`
    pub fn with_size(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            events: MapAdapterEvents::default(),
            state: Mutex::new(HeadlessState::default()),
        }
    }

    /// Layer adapters of the headless engine
    pub fn default_layer_adapters() -> Vec<AdapterFactory> {
        vec![
            FnAdapterFactory::shared(AdapterKind::Tile, |_, _| Box::new(TileAdapter::new())),
            FnAdapterFactory::shared(AdapterKind::Image, |_, _| Box::new(ImageAdapter::new())),
            FnAdapterFactory::shared(AdapterKind::GeoJson, |_, _| Box::new(GeoJsonAdapter::new())),
            FnAdapterFactory::shared(AdapterKind::Marker, |_, _| Box::new(MarkerAdapter::new())),
        ]
    }

    /// Simulates a user gesture moving the view
    pub fn simulate_move(&self, center: Option<LngLat>, zoom: Option<f64>) {
        self.change_view(|state| {
            if let Some(center) = center {
                state.center = Some(center);
            }
            if let Some(zoom) = zoom {
                state.zoom = Some(state.clamp_zoom(zoom));
            }
        });
    }

    /// Simulates a click on the map surface
    pub fn click(&self, lng_lat: LngLat, pixel: Pixel) {
        self.events
            .interaction
            .emit(&MapClickEvent { lng_lat, pixel });
    }

    pub fn create_count(&self) -> usize {
        self.state.lock().create_count
    }

    pub fn is_shown(&self, layer: &NativeLayer) -> bool {
        self.state.lock().visible.iter().any(|l| l.same(layer))
    }

    /// Number of native layers currently shown
    pub fn shown_count(&self) -> usize {
        self.state.lock().visible.len()
    }

    /// Number of native show requests received
    pub fn show_calls(&self) -> usize {
        self.state.lock().show_calls
    }

    pub fn removed_count(&self) -> usize {
        self.state.lock().removed.len()
    }

    pub fn is_removed(&self, layer: &NativeLayer) -> bool {
        self.state.lock().removed.iter().any(|l| l.same(layer))
    }

    /// Last order assigned to a native layer
    pub fn layer_order(&self, layer: &NativeLayer) -> Option<i32> {
        self.state
            .lock()
            .orders
            .iter()
            .rev()
            .find(|(l, _)| l.same(layer))
            .map(|(_, order)| *order)
    }

    pub fn layer_opacity(&self, layer: &NativeLayer) -> Option<f32> {
        self.state
            .lock()
            .opacities
            .iter()
            .rev()
            .find(|(l, _)| l.same(layer))
            .map(|(_, opacity)| *opacity)
    }

    pub fn last_fit(&self) -> Option<LngLatBounds> {
        self.state.lock().last_fit
    }

    pub fn cursor(&self) -> Option<String> {
        self.state.lock().cursor.clone()
    }

    /// Names and positions of mounted controls
    pub fn controls(&self) -> Vec<(String, ControlPosition)> {
        self.state
            .lock()
            .controls
            .iter()
            .map(|(control, position)| {
                let name = control
                    .downcast_ref::<HeadlessControl>()
                    .map(|c| c.name.clone())
                    .unwrap_or_default();
                (name, *position)
            })
            .collect()
    }

    /// Applies a view change and emits the raw and derived position events
    fn change_view(&self, change: impl FnOnce(&mut HeadlessState)) {
        let events = {
            let mut state = self.state.lock();
            let before = state.view();
            let mut events = state.tracker.update(MoveEdge::Start, before);

            change(&mut *state);
            let after = state.view();
            if before.zoom != after.zoom {
                events.push(PositionEvent::Zoom(after));
            }
            if before.center != after.center {
                events.push(PositionEvent::Move(after));
            }
            events.extend(state.tracker.update(MoveEdge::End, after));
            events
        };

        for event in &events {
            self.events.position.emit(event);
        }
    }

    /// Zoom at which `bounds` fits the container
    fn fit_zoom(&self, bounds: &LngLatBounds) -> f64 {
        let mercator_y = |lat: f64| {
            let lat = LngLat::clamp_lat(lat).to_radians();
            (PI / 4.0 + lat / 2.0).tan().ln()
        };
        let x_fraction = (bounds.east - bounds.west).abs() / 360.0;
        let y_fraction = (mercator_y(bounds.north) - mercator_y(bounds.south)).abs() / (2.0 * PI);

        let zoom_for = |pixels: f64, fraction: f64| {
            if fraction > 0.0 {
                (pixels / (TILE_SIZE as f64 * fraction)).log2()
            } else {
                f64::INFINITY
            }
        };
        zoom_for(self.width, x_fraction)
            .min(zoom_for(self.height, y_fraction))
            .floor()
    }
}

#[async_trait]
impl MapAdapter for HeadlessMapAdapter {
    async fn create(&self, options: &MapOptions) -> Result<()> {
        let map = {
            let mut state = self.state.lock();
            let map = NativeHandle::new(HeadlessMap {
                target: options.target.clone(),
                width: self.width,
                height: self.height,
            });
            state.map = Some(map.clone());
            state.options = options.clone();
            state.create_count += 1;
            let view = state.view();
            state.tracker.reset(view);
            map
        };
        log::debug!("headless map created ({}x{})", self.width, self.height);
        self.events.create.emit(&map);
        Ok(())
    }

    fn map(&self) -> Option<NativeMap> {
        self.state.lock().map.clone()
    }

    fn events(&self) -> &MapAdapterEvents {
        &self.events
    }

    fn layer_adapters(&self) -> Vec<AdapterFactory> {
        Self::default_layer_adapters()
    }

    fn set_center(&self, center: LngLat) {
        self.change_view(|state| state.center = Some(center));
    }

    fn get_center(&self) -> Option<LngLat> {
        self.state.lock().center
    }

    fn set_zoom(&self, zoom: f64) {
        self.change_view(|state| state.zoom = Some(state.clamp_zoom(zoom)));
    }

    fn get_zoom(&self) -> Option<f64> {
        self.state.lock().zoom
    }

    fn set_view(&self, center: LngLat, zoom: f64) {
        self.change_view(|state| {
            state.center = Some(center);
            state.zoom = Some(state.clamp_zoom(zoom));
        });
    }

    fn fit(&self, bounds: LngLatBounds, options: &FitOptions) {
        let mut zoom = self.fit_zoom(&bounds);
        if let Some(max_zoom) = options.max_zoom {
            zoom = zoom.min(max_zoom);
        }
        self.change_view(|state| {
            state.last_fit = Some(bounds);
            state.center = Some(bounds.center());
            state.zoom = Some(state.clamp_zoom(zoom));
        });
    }

    fn set_cursor(&self, cursor: &str) {
        self.state.lock().cursor = Some(cursor.to_string());
    }

    fn show_layer(&self, layer: &NativeLayer) {
        let mut state = self.state.lock();
        state.show_calls += 1;
        if !state.visible.iter().any(|l| l.same(layer)) {
            state.visible.push(layer.clone());
        }
    }

    fn hide_layer(&self, layer: &NativeLayer) {
        self.state.lock().visible.retain(|l| !l.same(layer));
    }

    fn remove_layer(&self, layer: &NativeLayer) {
        let mut state = self.state.lock();
        state.visible.retain(|l| !l.same(layer));
        state.removed.push(layer.clone());
    }

    fn set_layer_order(&self, layer: &NativeLayer, order: i32, _layers: &[LayerOrder]) {
        self.state.lock().orders.push((layer.clone(), order));
    }

    fn set_layer_opacity(&self, layer: &NativeLayer, opacity: f32) {
        self.state.lock().opacities.push((layer.clone(), opacity));
    }

    fn create_control(
        &self,
        control: Arc<dyn MapControl>,
        options: &CreateControlOptions,
    ) -> Option<NativeControl> {
        let name = options
            .add_class
            .clone()
            .unwrap_or_else(|| "custom".to_string());
        Some(NativeHandle::new(HeadlessControl {
            name,
            content: Some(control.on_add()),
            control: Some(control),
        }))
    }

    fn control_adapter(&self, kind: &ControlKind, _options: &ControlOptions) -> Option<NativeControl> {
        match kind {
            ControlKind::Zoom | ControlKind::Attribution => {
                Some(NativeHandle::new(HeadlessControl {
                    name: kind.to_string(),
                    content: None,
                    control: None,
                }))
            }
            ControlKind::Custom(_) => None,
        }
    }

    fn add_control(&self, control: &NativeControl, position: ControlPosition) -> Option<NativeControl> {
        self.state.lock().controls.push((control.clone(), position));
        Some(control.clone())
    }

    fn remove_control(&self, control: &NativeControl) {
        self.state.lock().controls.retain(|(c, _)| !c.same(control));
        if let Some(universal) = control
            .downcast_ref::<HeadlessControl>()
            .and_then(|c| c.control.as_ref())
        {
            universal.on_remove();
        }
    }
}

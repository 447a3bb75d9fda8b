use crate::{
    core::{adapter::NativeMap, geo::LngLat},
    data::geojson::GeoJsonFeature,
    input::handler::{EventManager, StatusEvents},
    layers::base::LayerHandle,
};

/// Layer lifecycle events emitted by the map
#[derive(Debug, Clone)]
pub enum LayerEvent {
    PreAdd(LayerHandle),
    Add(LayerHandle),
    PreRemove(LayerHandle),
    Remove(LayerHandle),
    PreShow(LayerHandle),
    Show(LayerHandle),
    PreHide(LayerHandle),
    Hide(LayerHandle),
}

impl LayerEvent {
    /// Public event name, e.g. `layer:preadd`
    pub fn name(&self) -> &'static str {
        match self {
            LayerEvent::PreAdd(_) => "layer:preadd",
            LayerEvent::Add(_) => "layer:add",
            LayerEvent::PreRemove(_) => "layer:preremove",
            LayerEvent::Remove(_) => "layer:remove",
            LayerEvent::PreShow(_) => "layer:preshow",
            LayerEvent::Show(_) => "layer:show",
            LayerEvent::PreHide(_) => "layer:prehide",
            LayerEvent::Hide(_) => "layer:hide",
        }
    }

    /// The layer the event is about
    pub fn layer(&self) -> &LayerHandle {
        match self {
            LayerEvent::PreAdd(l)
            | LayerEvent::Add(l)
            | LayerEvent::PreRemove(l)
            | LayerEvent::Remove(l)
            | LayerEvent::PreShow(l)
            | LayerEvent::Show(l)
            | LayerEvent::PreHide(l)
            | LayerEvent::Hide(l) => l,
        }
    }
}

/// Pixel offset of a pointer event inside the map container
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pixel {
    pub left: f64,
    pub top: f64,
}

/// Click on the map surface
#[derive(Debug, Clone, PartialEq)]
pub struct MapClickEvent {
    pub lng_lat: LngLat,
    pub pixel: Pixel,
}

/// Click on a feature of a vector layer
#[derive(Debug, Clone, PartialEq)]
pub struct LayerClickEvent {
    pub layer_id: String,
    pub feature: Option<GeoJsonFeature>,
    pub selected: bool,
}

/// Pointer interaction events
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionEvent {
    Click(MapClickEvent),
    LayerClick(LayerClickEvent),
}

impl InteractionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            InteractionEvent::Click(_) => "click",
            InteractionEvent::LayerClick(_) => "layer:click",
        }
    }
}

/// View state carried by position events
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewState {
    pub center: Option<LngLat>,
    pub zoom: Option<f64>,
}

/// Map position change events
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionEvent {
    ZoomStart(ViewState),
    Zoom(ViewState),
    ZoomEnd(ViewState),
    MoveStart(ViewState),
    Move(ViewState),
    MoveEnd(ViewState),
}

impl PositionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PositionEvent::ZoomStart(_) => "zoomstart",
            PositionEvent::Zoom(_) => "zoom",
            PositionEvent::ZoomEnd(_) => "zoomend",
            PositionEvent::MoveStart(_) => "movestart",
            PositionEvent::Move(_) => "move",
            PositionEvent::MoveEnd(_) => "moveend",
        }
    }

    pub fn view(&self) -> ViewState {
        match *self {
            PositionEvent::ZoomStart(v)
            | PositionEvent::Zoom(v)
            | PositionEvent::ZoomEnd(v)
            | PositionEvent::MoveStart(v)
            | PositionEvent::Move(v)
            | PositionEvent::MoveEnd(v) => v,
        }
    }
}

/// One-shot map status events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusEvent {
    Create,
    BuildMap,
}

impl StatusEvent {
    pub fn name(&self) -> &'static str {
        match self {
            StatusEvent::Create => "create",
            StatusEvent::BuildMap => "build-map",
        }
    }
}

/// Events a map adapter surfaces to the core
#[derive(Default)]
pub struct MapAdapterEvents {
    /// Fired once the native map object exists
    pub create: EventManager<NativeMap>,
    pub interaction: EventManager<MapClickEvent>,
    pub position: EventManager<PositionEvent>,
}

/// Events the web map publishes to application code, one channel per category
#[derive(Default)]
pub struct WebMapEvents {
    pub lifecycle: EventManager<LayerEvent>,
    pub interaction: EventManager<InteractionEvent>,
    pub position: EventManager<PositionEvent>,
    pub status: StatusEvents<StatusEvent>,
}

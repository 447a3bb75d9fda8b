pub mod events;
pub mod handler;
pub mod position;

// Re-export the essential types
pub use events::{
    InteractionEvent, LayerClickEvent, LayerEvent, MapAdapterEvents, MapClickEvent, Pixel,
    PositionEvent, StatusEvent, ViewState, WebMapEvents,
};
pub use handler::{EventCallback, EventManager, ListenerId, StatusEvents};
pub use position::{MoveEdge, PositionTracker};

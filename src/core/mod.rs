pub mod adapter;
pub mod builder;
pub mod config;
pub mod constants;
pub mod geo;
pub mod headless;
pub mod layer_ops;
pub mod map;
pub mod visibility;

pub use adapter::{LayerOrder, MapAdapter, NativeControl, NativeHandle, NativeLayer, NativeMap};
pub use builder::WebMapBuilder;
pub use config::{FitOptions, MapOptions};
pub use geo::{LngLat, LngLatBounds};
pub use headless::HeadlessMapAdapter;
pub use layer_ops::LayerDef;
pub use map::{ControlRef, WeakWebMap, WebMap};

pub mod geojson;
pub mod paint;

pub use geojson::{GeoJson, GeoJsonFeature, GeoJsonGeometry, GeometryKind, VectorLayerType};
pub use paint::{Paint, PaintFunction, PaintSpec, PaintType};

use crate::core::geo::{LngLat, LngLatBounds};
use crate::prelude::HashMap;
use serde::{Deserialize, Serialize};

/// GeoJSON geometry types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJsonGeometry {
    Point {
        coordinates: [f64; 2],
    },
    LineString {
        coordinates: Vec<[f64; 2]>,
    },
    Polygon {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPoint {
        coordinates: Vec<[f64; 2]>,
    },
    MultiLineString {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<[f64; 2]>>>,
    },
    GeometryCollection {
        geometries: Vec<GeoJsonGeometry>,
    },
}

/// Discriminant of [`GeoJsonGeometry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,
}

/// How a vector layer draws its geometries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorLayerType {
    Circle,
    Line,
    Fill,
}

impl GeometryKind {
    /// Vector layer type able to draw this geometry, if any
    pub fn layer_type(&self) -> Option<VectorLayerType> {
        match self {
            GeometryKind::Point | GeometryKind::MultiPoint => Some(VectorLayerType::Circle),
            GeometryKind::LineString | GeometryKind::MultiLineString => {
                Some(VectorLayerType::Line)
            }
            GeometryKind::Polygon | GeometryKind::MultiPolygon => Some(VectorLayerType::Fill),
            GeometryKind::GeometryCollection => None,
        }
    }
}

/// GeoJSON feature with geometry and properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoJsonFeature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    pub geometry: Option<GeoJsonGeometry>,
    #[serde(default)]
    pub properties: Option<HashMap<String, serde_json::Value>>,
}

impl GeoJsonFeature {
    pub fn new(geometry: GeoJsonGeometry) -> Self {
        Self {
            id: None,
            geometry: Some(geometry),
            properties: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<serde_json::Value>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_property(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.properties
            .get_or_insert_with(HashMap::default)
            .insert(key.to_string(), value.into());
        self
    }

    /// Reads a property value
    pub fn property(&self, key: &str) -> Option<&serde_json::Value> {
        self.properties.as_ref().and_then(|p| p.get(key))
    }
}

/// Root GeoJSON object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJson {
    Feature(GeoJsonFeature),
    FeatureCollection { features: Vec<GeoJsonFeature> },
    Geometry(GeoJsonGeometry),
}

impl GeoJson {
    /// Parses GeoJSON from a JSON string
    pub fn parse(geojson_str: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(geojson_str)?)
    }

    /// Collection wrapping the given features
    pub fn collection(features: Vec<GeoJsonFeature>) -> Self {
        GeoJson::FeatureCollection { features }
    }

    /// Flattens the object into owned features. A bare geometry becomes a
    /// property-less feature.
    pub fn into_features(self) -> Vec<GeoJsonFeature> {
        match self {
            GeoJson::Feature(feature) => vec![feature],
            GeoJson::FeatureCollection { features } => features,
            GeoJson::Geometry(geometry) => vec![GeoJsonFeature::new(geometry)],
        }
    }

    /// Geometries of every feature
    pub fn geometries(&self) -> Vec<&GeoJsonGeometry> {
        match self {
            GeoJson::Feature(feature) => feature.geometry.iter().collect(),
            GeoJson::FeatureCollection { features } => {
                features.iter().filter_map(|f| f.geometry.as_ref()).collect()
            }
            GeoJson::Geometry(geometry) => vec![geometry],
        }
    }

    /// Most frequent geometry kind in the object. Ties go to the kind seen first.
    pub fn detect_geometry_kind(&self) -> Option<GeometryKind> {
        let geometries = self.geometries();
        let mut counts: Vec<(GeometryKind, usize)> = Vec::new();
        for geometry in geometries {
            let kind = geometry.kind();
            match counts.iter_mut().find(|(k, _)| *k == kind) {
                Some((_, count)) => *count += 1,
                None => counts.push((kind, 1)),
            }
        }

        let mut best: Option<(GeometryKind, usize)> = None;
        for (kind, count) in counts {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((kind, count));
            }
        }
        best.map(|(kind, _)| kind)
    }

    /// Gets the bounding box of all geometries
    pub fn bounds(&self) -> Option<LngLatBounds> {
        bounds_of(self.geometries().into_iter())
    }
}

/// Bounding box of a set of geometries
pub fn bounds_of<'a>(geometries: impl Iterator<Item = &'a GeoJsonGeometry>) -> Option<LngLatBounds> {
    let mut bounds: Option<LngLatBounds> = None;
    for geometry in geometries {
        for point in geometry.points() {
            match bounds.as_mut() {
                Some(b) => b.extend(&point),
                None => bounds = Some(LngLatBounds::from_point(point)),
            }
        }
    }
    bounds
}

impl GeoJsonGeometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            GeoJsonGeometry::Point { .. } => GeometryKind::Point,
            GeoJsonGeometry::LineString { .. } => GeometryKind::LineString,
            GeoJsonGeometry::Polygon { .. } => GeometryKind::Polygon,
            GeoJsonGeometry::MultiPoint { .. } => GeometryKind::MultiPoint,
            GeoJsonGeometry::MultiLineString { .. } => GeometryKind::MultiLineString,
            GeoJsonGeometry::MultiPolygon { .. } => GeometryKind::MultiPolygon,
            GeoJsonGeometry::GeometryCollection { .. } => GeometryKind::GeometryCollection,
        }
    }

    /// Every vertex of the geometry; polygons contribute their exterior ring
    pub fn points(&self) -> Vec<LngLat> {
        let to_point = |c: &[f64; 2]| LngLat::new(c[0], c[1]);
        match self {
            GeoJsonGeometry::Point { coordinates } => vec![to_point(coordinates)],
            GeoJsonGeometry::LineString { coordinates }
            | GeoJsonGeometry::MultiPoint { coordinates } => {
                coordinates.iter().map(to_point).collect()
            }
            GeoJsonGeometry::Polygon { coordinates } => coordinates
                .first()
                .map(|exterior| exterior.iter().map(to_point).collect())
                .unwrap_or_default(),
            GeoJsonGeometry::MultiLineString { coordinates } => {
                coordinates.iter().flatten().map(to_point).collect()
            }
            GeoJsonGeometry::MultiPolygon { coordinates } => coordinates
                .iter()
                .filter_map(|polygon| polygon.first())
                .flatten()
                .map(to_point)
                .collect(),
            GeoJsonGeometry::GeometryCollection { geometries } => {
                geometries.iter().flat_map(|g| g.points()).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geojson_parsing() {
        let geojson_str = r#"
        {
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"name": "Test Point"},
                    "geometry": {
                        "type": "Point",
                        "coordinates": [-74.0060, 40.7128]
                    }
                }
            ]
        }
        "#;

        let geojson = GeoJson::parse(geojson_str).unwrap();
        let features = geojson.into_features();
        assert_eq!(features.len(), 1);
        assert_eq!(
            features[0].property("name"),
            Some(&serde_json::json!("Test Point"))
        );
    }

    #[test]
    fn test_bounds_calculation() {
        let geojson = GeoJson::collection(vec![
            GeoJsonFeature::new(GeoJsonGeometry::Point {
                coordinates: [-74.0060, 40.7128],
            }),
            GeoJsonFeature::new(GeoJsonGeometry::Point {
                coordinates: [-73.9857, 40.7489],
            }),
        ]);

        let bounds = geojson.bounds().unwrap();
        assert_eq!(bounds.south, 40.7128);
        assert_eq!(bounds.north, 40.7489);
        assert_eq!(bounds.west, -74.0060);
    }

    #[test]
    fn test_detect_most_frequent_geometry() {
        let line = GeoJsonGeometry::LineString {
            coordinates: vec![[0.0, 0.0], [1.0, 1.0]],
        };
        let point = GeoJsonGeometry::Point {
            coordinates: [0.0, 0.0],
        };
        let geojson = GeoJson::collection(vec![
            GeoJsonFeature::new(point.clone()),
            GeoJsonFeature::new(line.clone()),
            GeoJsonFeature::new(line),
        ]);

        let kind = geojson.detect_geometry_kind().unwrap();
        assert_eq!(kind, GeometryKind::LineString);
        assert_eq!(kind.layer_type(), Some(VectorLayerType::Line));
        assert_eq!(GeoJson::collection(vec![]).detect_geometry_kind(), None);
    }
}

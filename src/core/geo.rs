use serde::{Deserialize, Serialize};

const MAX_LATITUDE: f64 = 85.0511287798;

/// Geographical coordinate in `[longitude, latitude]` order.
///
/// Serialized as a two element array, the same shape map options and server
/// settings use on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Validates that the coordinates are within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat >= -90.0 && self.lat <= 90.0 && self.lng >= -180.0 && self.lng <= 180.0
    }

    /// Clamps latitude to the Web Mercator range
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
    }
}

impl Default for LngLat {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl From<[f64; 2]> for LngLat {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self::new(lng, lat)
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(value: LngLat) -> Self {
        [value.lng, value.lat]
    }
}

/// Bounding box in `[west, south, east, north]` order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct LngLatBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl LngLatBounds {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Bounds collapsed onto a single point
    pub fn from_point(point: LngLat) -> Self {
        Self::new(point.lng, point.lat, point.lng, point.lat)
    }

    /// Checks if the bounds contain a point
    pub fn contains(&self, point: &LngLat) -> bool {
        point.lat >= self.south
            && point.lat <= self.north
            && point.lng >= self.west
            && point.lng <= self.east
    }

    /// Extends the bounds to include a point
    pub fn extend(&mut self, point: &LngLat) {
        self.west = self.west.min(point.lng);
        self.south = self.south.min(point.lat);
        self.east = self.east.max(point.lng);
        self.north = self.north.max(point.lat);
    }

    /// Gets the center point of the bounds
    pub fn center(&self) -> LngLat {
        LngLat::new((self.west + self.east) / 2.0, (self.south + self.north) / 2.0)
    }

    /// Returns the union of this bounds with another bounds
    pub fn union(&self, other: &LngLatBounds) -> LngLatBounds {
        LngLatBounds::new(
            self.west.min(other.west),
            self.south.min(other.south),
            self.east.max(other.east),
            self.north.max(other.north),
        )
    }
}

impl From<[f64; 4]> for LngLatBounds {
    fn from([west, south, east, north]: [f64; 4]) -> Self {
        Self::new(west, south, east, north)
    }
}

impl From<LngLatBounds> for [f64; 4] {
    fn from(value: LngLatBounds) -> Self {
        [value.west, value.south, value.east, value.north]
    }
}

//! Map configuration.
//!
//! `MapOptions` is what the application hands to [`WebMap::create`]. Every
//! field has a default so partial JSON configurations deserialize cleanly, and
//! [`MapOptions::merge`] lays caller options over the defaults the same way
//! the map merges them at creation.
//!
//! [`WebMap::create`]: crate::core::map::WebMap::create

use crate::core::constants::*;
use crate::core::geo::{LngLat, LngLatBounds};
use crate::data::paint::Paint;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapOptions {
    /// Engine specific container reference (element id, window name...)
    pub target: Option<String>,
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
    pub center: Option<LngLat>,
    pub zoom: Option<f64>,
    /// Initial extent; takes precedence over `center`/`zoom`
    pub bounds: Option<LngLatBounds>,
    pub paint: Option<Paint>,
    pub selected_paint: Option<Paint>,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            target: None,
            min_zoom: Some(DEFAULT_MIN_ZOOM),
            max_zoom: Some(DEFAULT_MAX_ZOOM),
            center: None,
            zoom: None,
            bounds: None,
            paint: Some(Paint {
                color: Some(DEFAULT_PAINT_COLOR.to_string()),
                opacity: Some(1.0),
                radius: Some(DEFAULT_PAINT_RADIUS),
                weight: Some(1.0),
                ..Default::default()
            }),
            selected_paint: Some(Paint {
                color: Some(DEFAULT_SELECTED_PAINT_COLOR.to_string()),
                opacity: Some(1.0),
                radius: Some(DEFAULT_SELECTED_PAINT_RADIUS),
                weight: Some(1.0),
                ..Default::default()
            }),
        }
    }
}

impl MapOptions {
    /// Parses options from JSON, filling missing fields with defaults
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Overlays `other` on `self`: set fields of `other` win, paints are
    /// merged field by field.
    pub fn merge(&self, other: &MapOptions) -> MapOptions {
        let merge_paint = |base: &Option<Paint>, top: &Option<Paint>| match (base, top) {
            (Some(base), Some(top)) => Some(top.merged_over(base)),
            (base, top) => top.clone().or_else(|| base.clone()),
        };
        MapOptions {
            target: other.target.clone().or_else(|| self.target.clone()),
            min_zoom: other.min_zoom.or(self.min_zoom),
            max_zoom: other.max_zoom.or(self.max_zoom),
            center: other.center.or(self.center),
            zoom: other.zoom.or(self.zoom),
            bounds: other.bounds.or(self.bounds),
            paint: merge_paint(&self.paint, &other.paint),
            selected_paint: merge_paint(&self.selected_paint, &other.selected_paint),
        }
    }

    pub fn with_target(mut self, target: &str) -> Self {
        self.target = Some(target.to_string());
        self
    }

    pub fn with_center(mut self, center: LngLat, zoom: f64) -> Self {
        self.center = Some(center);
        self.zoom = Some(zoom);
        self
    }

    pub fn with_bounds(mut self, bounds: LngLatBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_zoom_range(mut self, min_zoom: f64, max_zoom: f64) -> Self {
        self.min_zoom = Some(min_zoom);
        self.max_zoom = Some(max_zoom);
        self
    }
}

/// Options of a fit-to-bounds request
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FitOptions {
    pub max_zoom: Option<f64>,
    pub padding: Option<f64>,
}

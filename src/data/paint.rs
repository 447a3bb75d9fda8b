use crate::data::geojson::GeoJsonFeature;
use crate::prelude::Arc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rendering primitive a paint targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaintType {
    Circle,
    Path,
    Icon,
    Line,
    Fill,
}

/// Style information for rendering vector features.
///
/// Every field is optional so a caller paint can be laid over map-level
/// defaults field by field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Paint {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub paint_type: Option<PaintType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<bool>,
    /// Icon markup or class name; marks the paint as an icon paint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Paint {
    pub fn color(color: &str) -> Self {
        Self {
            color: Some(color.to_string()),
            ..Default::default()
        }
    }

    pub fn is_icon(&self) -> bool {
        self.icon.is_some()
    }

    /// Fills the unset fields of `self` from `defaults`
    pub fn merged_over(&self, defaults: &Paint) -> Paint {
        Paint {
            paint_type: self.paint_type.or(defaults.paint_type),
            color: self.color.clone().or_else(|| defaults.color.clone()),
            opacity: self.opacity.or(defaults.opacity),
            radius: self.radius.or(defaults.radius),
            weight: self.weight.or(defaults.weight),
            fill: self.fill.or(defaults.fill),
            stroke: self.stroke.or(defaults.stroke),
            icon: self.icon.clone().or_else(|| defaults.icon.clone()),
        }
    }
}

/// Paint computed per feature
pub type PaintFunction = Arc<dyn Fn(&GeoJsonFeature) -> Paint + Send + Sync>;

/// Either a fixed paint or a per-feature paint function
#[derive(Clone)]
pub enum PaintSpec {
    Static(Paint),
    Feature(PaintFunction),
}

impl PaintSpec {
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&GeoJsonFeature) -> Paint + Send + Sync + 'static,
    {
        PaintSpec::Feature(Arc::new(f))
    }

    /// Paint for one feature
    pub fn resolve(&self, feature: &GeoJsonFeature) -> Paint {
        match self {
            PaintSpec::Static(paint) => paint.clone(),
            PaintSpec::Feature(f) => f(feature),
        }
    }

    /// Lays the spec over `defaults`. Function paints are wrapped so every
    /// computed paint is completed from the defaults.
    pub fn prepare(self, defaults: &Paint) -> PaintSpec {
        match self {
            PaintSpec::Static(paint) => PaintSpec::Static(paint.merged_over(defaults)),
            PaintSpec::Feature(f) => {
                let defaults = defaults.clone();
                PaintSpec::Feature(Arc::new(move |feature| f(feature).merged_over(&defaults)))
            }
        }
    }

    pub fn as_static(&self) -> Option<&Paint> {
        match self {
            PaintSpec::Static(paint) => Some(paint),
            PaintSpec::Feature(_) => None,
        }
    }

    pub fn as_static_mut(&mut self) -> Option<&mut Paint> {
        match self {
            PaintSpec::Static(paint) => Some(paint),
            PaintSpec::Feature(_) => None,
        }
    }
}

impl Default for PaintSpec {
    fn default() -> Self {
        PaintSpec::Static(Paint::default())
    }
}

impl From<Paint> for PaintSpec {
    fn from(paint: Paint) -> Self {
        PaintSpec::Static(paint)
    }
}

impl fmt::Debug for PaintSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaintSpec::Static(paint) => f.debug_tuple("Static").field(paint).finish(),
            PaintSpec::Feature(_) => f.write_str("Feature(<fn>)"),
        }
    }
}

//! Classification of a fetched resource into the adapter that renders it.

use crate::{
    layers::base::AdapterKind,
    ngw::resource::{ResourceCls, ResourceId, ResourceItem},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Adapter a caller may request for an NGW resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NgwAdapterType {
    Image,
    Tile,
    #[serde(rename = "GEOJSON")]
    GeoJson,
}

impl From<NgwAdapterType> for AdapterKind {
    fn from(adapter: NgwAdapterType) -> Self {
        match adapter {
            NgwAdapterType::Image => AdapterKind::Image,
            NgwAdapterType::Tile => AdapterKind::Tile,
            NgwAdapterType::GeoJson => AdapterKind::GeoJson,
        }
    }
}

impl fmt::Display for NgwAdapterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        AdapterKind::from(*self).fmt(f)
    }
}

impl FromStr for NgwAdapterType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "IMAGE" => Ok(NgwAdapterType::Image),
            "TILE" => Ok(NgwAdapterType::Tile),
            "GEOJSON" => Ok(NgwAdapterType::GeoJson),
            other => Err(format!("unknown NGW adapter {}", other)),
        }
    }
}

/// What a resource resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// A web map: its layer tree is materialized layer by layer
    WebMap,
    /// Features of `resource` drawn by the GeoJSON adapter
    GeoJson { resource: ResourceId },
    /// Style `resource` rendered server side
    Raster { resource: ResourceId },
    /// Rendered through the first style found among the children of `parent`
    NeedsStyle { parent: ResourceId },
    Unknown,
}

/// Classifies an already fetched resource. `hint` is the adapter the caller
/// asked for, if any.
pub fn classify(item: &ResourceItem, hint: Option<NgwAdapterType>) -> Classification {
    let id = item.id();
    if item.webmap.is_some() {
        return Classification::WebMap;
    }

    let cls = item.cls();
    if cls.is_style() {
        return match hint {
            // Styles have no geometry; the features live on the parent layer
            Some(NgwAdapterType::GeoJson) => Classification::GeoJson {
                resource: item.parent_id().unwrap_or(id),
            },
            _ => Classification::Raster { resource: id },
        };
    }

    match cls {
        ResourceCls::VectorLayer => match hint {
            Some(hint) if hint != NgwAdapterType::GeoJson => {
                Classification::NeedsStyle { parent: id }
            }
            _ => Classification::GeoJson { resource: id },
        },
        ResourceCls::RasterLayer => Classification::NeedsStyle { parent: id },
        _ => Classification::Unknown,
    }
}

/// Adapter used when the resource metadata could not be fetched
pub fn fallback(resource: ResourceId, hint: Option<NgwAdapterType>) -> Classification {
    match hint {
        Some(NgwAdapterType::GeoJson) => Classification::GeoJson { resource },
        _ => Classification::Raster { resource },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ngw::resource::WebMapSettings;

    #[test]
    fn test_vector_layer() {
        let item = ResourceItem::new(5, ResourceCls::VectorLayer);
        assert_eq!(classify(&item, None), Classification::GeoJson { resource: 5 });
        assert_eq!(
            classify(&item, Some(NgwAdapterType::GeoJson)),
            Classification::GeoJson { resource: 5 }
        );
        assert_eq!(
            classify(&item, Some(NgwAdapterType::Image)),
            Classification::NeedsStyle { parent: 5 }
        );
    }

    #[test]
    fn test_styles_redirect_geojson_to_parent() {
        let style = ResourceItem::new(20, ResourceCls::QgisVectorStyle).with_parent(5);
        assert_eq!(
            classify(&style, Some(NgwAdapterType::GeoJson)),
            Classification::GeoJson { resource: 5 }
        );
        assert_eq!(classify(&style, None), Classification::Raster { resource: 20 });
        assert_eq!(
            classify(&style, Some(NgwAdapterType::Tile)),
            Classification::Raster { resource: 20 }
        );
    }

    #[test]
    fn test_raster_webmap_and_unknown() {
        let raster = ResourceItem::new(9, ResourceCls::RasterLayer).with_parent(1);
        assert_eq!(
            classify(&raster, Some(NgwAdapterType::GeoJson)),
            Classification::NeedsStyle { parent: 9 }
        );

        let webmap = ResourceItem::new(3, ResourceCls::Other).with_webmap(WebMapSettings::default());
        assert_eq!(classify(&webmap, None), Classification::WebMap);

        let group = ResourceItem::new(0, ResourceCls::ResourceGroup);
        assert_eq!(classify(&group, None), Classification::Unknown);
    }

    #[test]
    fn test_fallback_uses_hint_only() {
        assert_eq!(
            fallback(7, Some(NgwAdapterType::GeoJson)),
            Classification::GeoJson { resource: 7 }
        );
        assert_eq!(fallback(7, None), Classification::Raster { resource: 7 });
        assert_eq!("geojson".parse(), Ok(NgwAdapterType::GeoJson));
    }
}

//! NextGIS Web resource descriptors, as returned by `/api/resource/{id}`.

use crate::{core::geo::LngLatBounds, ngw::tree::TreeGroup};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type ResourceId = u64;

/// Resource class. Only the classes the adapter selection cares about are
/// named; everything else deserializes to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceCls {
    ResourceGroup,
    VectorLayer,
    RasterLayer,
    MapserverStyle,
    QgisVectorStyle,
    RasterStyle,
    Webmap,
    #[serde(other)]
    Other,
}

impl ResourceCls {
    /// Classes rendered server side for their parent layer
    pub fn is_style(&self) -> bool {
        matches!(
            self,
            ResourceCls::MapserverStyle | ResourceCls::QgisVectorStyle | ResourceCls::RasterStyle
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub id: ResourceId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub cls: ResourceCls,
    #[serde(default)]
    pub parent: Option<ResourceRef>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub keyname: Option<String>,
}

/// Web map section of a resource item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebMapSettings {
    #[serde(default)]
    pub extent_left: Option<f64>,
    #[serde(default)]
    pub extent_right: Option<f64>,
    #[serde(default)]
    pub extent_bottom: Option<f64>,
    #[serde(default)]
    pub extent_top: Option<f64>,
    #[serde(default)]
    pub root_item: Option<TreeGroup>,
}

impl WebMapSettings {
    /// Configured initial extent, when all four sides are set
    pub fn extent(&self) -> Option<LngLatBounds> {
        Some(LngLatBounds::new(
            self.extent_left?,
            self.extent_bottom?,
            self.extent_right?,
            self.extent_top?,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceItem {
    pub resource: Resource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webmap: Option<WebMapSettings>,
}

impl ResourceItem {
    pub fn new(id: ResourceId, cls: ResourceCls) -> Self {
        Self {
            resource: Resource {
                id,
                cls,
                parent: None,
                display_name: None,
                keyname: None,
            },
            webmap: None,
        }
    }

    pub fn with_parent(mut self, parent: ResourceId) -> Self {
        self.resource.parent = Some(ResourceRef { id: parent });
        self
    }

    pub fn with_display_name(mut self, name: &str) -> Self {
        self.resource.display_name = Some(name.to_string());
        self
    }

    pub fn with_webmap(mut self, settings: WebMapSettings) -> Self {
        self.resource.cls = ResourceCls::Webmap;
        self.webmap = Some(settings);
        self
    }

    pub fn id(&self) -> ResourceId {
        self.resource.id
    }

    pub fn cls(&self) -> ResourceCls {
        self.resource.cls
    }

    pub fn parent_id(&self) -> Option<ResourceId> {
        self.resource.parent.map(|parent| parent.id)
    }
}

impl fmt::Display for ResourceItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.resource.display_name {
            Some(name) => write!(f, "{} ({:?} #{})", name, self.resource.cls, self.resource.id),
            None => write!(f, "{:?} #{}", self.resource.cls, self.resource.id),
        }
    }
}

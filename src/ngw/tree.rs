//! Layer tree of an NGW web map.
//!
//! A tree has exactly one root group. Groups only hold children; every
//! `layer` node is materialized into one map layer.

use crate::ngw::resource::ResourceId;
use serde::{Deserialize, Serialize};

/// Scale denominator of web mercator zoom 0 with 0.28 mm pixels
const ZOOM_0_SCALE_DENOM: f64 = 559_082_264.028_717_8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "item_type", rename_all = "lowercase")]
pub enum TreeItem {
    Root(TreeGroup),
    Group(TreeGroup),
    Layer(TreeLayer),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeGroup {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub group_expanded: bool,
    #[serde(default)]
    pub children: Vec<TreeItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeLayer {
    #[serde(default)]
    pub display_name: Option<String>,
    /// Adapter requested by the web map (`image` or `tile`)
    #[serde(default)]
    pub layer_adapter: Option<String>,
    #[serde(default)]
    pub layer_enabled: bool,
    pub layer_style_id: ResourceId,
    /// Largest scale (most zoomed in) the layer is drawn at
    #[serde(default)]
    pub layer_min_scale_denom: Option<f64>,
    #[serde(default)]
    pub layer_max_scale_denom: Option<f64>,
    /// Transparency in percent
    #[serde(default)]
    pub layer_transparency: Option<f64>,
}

impl TreeLayer {
    pub fn new(style_id: ResourceId) -> Self {
        Self {
            display_name: None,
            layer_adapter: None,
            layer_enabled: false,
            layer_style_id: style_id,
            layer_min_scale_denom: None,
            layer_max_scale_denom: None,
            layer_transparency: None,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.layer_enabled = enabled;
        self
    }

    pub fn with_adapter(mut self, adapter: &str) -> Self {
        self.layer_adapter = Some(adapter.to_string());
        self
    }

    pub fn with_scale_range(mut self, min_denom: Option<f64>, max_denom: Option<f64>) -> Self {
        self.layer_min_scale_denom = min_denom;
        self.layer_max_scale_denom = max_denom;
        self
    }

    /// Zoom range `(min_zoom, max_zoom)` matching the scale denominators.
    ///
    /// The largest denominator bounds the minimum zoom and the smallest one
    /// the maximum zoom.
    pub fn zoom_range(&self) -> (Option<f64>, Option<f64>) {
        (
            self.layer_max_scale_denom.and_then(scale_to_zoom),
            self.layer_min_scale_denom.and_then(scale_to_zoom),
        )
    }

    /// Opacity in `0..=1` derived from the transparency percentage
    pub fn opacity(&self) -> Option<f32> {
        self.layer_transparency
            .map(|transparency| (1.0 - transparency / 100.0).clamp(0.0, 1.0) as f32)
    }
}

fn scale_to_zoom(denom: f64) -> Option<f64> {
    (denom.is_finite() && denom > 0.0).then(|| (ZOOM_0_SCALE_DENOM / denom).log2().max(0.0))
}

impl TreeGroup {
    pub fn new(children: Vec<TreeItem>) -> Self {
        Self {
            children,
            ..Default::default()
        }
    }

    /// Layer nodes in drawing order (depth first, children in tree order)
    pub fn layers(&self) -> Vec<&TreeLayer> {
        let mut layers = Vec::new();
        collect_layers(&self.children, &mut layers);
        layers
    }

    /// Checks that no root node is nested below this root
    pub fn is_well_formed(&self) -> bool {
        self.children.iter().all(|child| match child {
            TreeItem::Root(_) => false,
            TreeItem::Group(group) => group.is_well_formed(),
            TreeItem::Layer(_) => true,
        })
    }
}

fn collect_layers<'a>(items: &'a [TreeItem], out: &mut Vec<&'a TreeLayer>) {
    for item in items {
        match item {
            TreeItem::Layer(layer) => out.push(layer),
            TreeItem::Group(group) | TreeItem::Root(group) => collect_layers(&group.children, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TREE: &str = r#"{
        "item_type": "root",
        "children": [
            {"item_type": "layer", "layer_style_id": 20, "layer_enabled": true,
             "layer_adapter": "image", "layer_transparency": 25.0},
            {"item_type": "group", "display_name": "Roads", "children": [
                {"item_type": "layer", "layer_style_id": 31, "layer_enabled": false,
                 "layer_min_scale_denom": 5000, "draw_order_position": 2},
                {"item_type": "group", "children": [
                    {"item_type": "layer", "layer_style_id": 32, "layer_enabled": true}
                ]}
            ]}
        ]
    }"#;

    #[test]
    fn test_parse_and_flatten_tree() {
        let item: TreeItem = serde_json::from_str(TREE).unwrap();
        let root = match item {
            TreeItem::Root(root) => root,
            other => panic!("expected root, got {:?}", other),
        };

        assert!(root.is_well_formed());
        let ids: Vec<ResourceId> = root.layers().iter().map(|l| l.layer_style_id).collect();
        assert_eq!(ids, vec![20, 31, 32]);

        let first = root.layers()[0];
        assert_eq!(first.layer_adapter.as_deref(), Some("image"));
        assert_eq!(first.opacity(), Some(0.75));
    }

    #[test]
    fn test_scale_bounds_to_zoom_range() {
        let layer = TreeLayer::new(20)
            .with_scale_range(Some(ZOOM_0_SCALE_DENOM / 131_072.0), Some(ZOOM_0_SCALE_DENOM / 4.0));
        let (min_zoom, max_zoom) = layer.zoom_range();

        assert!((min_zoom.unwrap() - 2.0).abs() < 1e-6);
        assert!((max_zoom.unwrap() - 17.0).abs() < 1e-6);
        assert_eq!(TreeLayer::new(20).zoom_range(), (None, None));
        assert_eq!(
            TreeLayer::new(20).with_scale_range(Some(0.0), None).zoom_range(),
            (None, None)
        );
    }

    #[test]
    fn test_nested_root_is_rejected() {
        let tree = TreeGroup::new(vec![TreeItem::Group(TreeGroup::new(vec![TreeItem::Root(
            TreeGroup::default(),
        )]))]);
        assert!(!tree.is_well_formed());
    }
}

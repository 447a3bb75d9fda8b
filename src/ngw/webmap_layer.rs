//! Composite layer materializing an NGW web map.
//!
//! Every layer node of the web map tree becomes an ordinary map layer,
//! resolved like any other NGW resource. The composite itself draws nothing:
//! showing, hiding and removing it acts on its children.

use crate::{
    core::{
        adapter::{NativeHandle, NativeLayer, NativeMap},
        geo::LngLatBounds,
    },
    layers::{
        base::{AdapterKind, EventHandled, LayerAdapter, LayerHandle, LayerOptions},
        factory::{AdapterFactory, LayerAdapterFactory},
    },
    ngw::{
        resolver::{resolve, NgwLayerOptions, ResolveContext},
        resource::{ResourceId, WebMapSettings},
        tree::{TreeGroup, TreeLayer},
    },
    prelude::Arc,
    Result, WebMapError,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::any::Any;

pub const WEBMAP_ADAPTER: &str = "NGW:WEBMAP";

pub fn webmap_kind() -> AdapterKind {
    AdapterKind::Custom(WEBMAP_ADAPTER.to_string())
}

/// Native object of a web map layer
#[derive(Debug, Clone, PartialEq)]
pub struct WebMapTree {
    pub resource: ResourceId,
    pub settings: WebMapSettings,
}

/// A tree layer node and the map layer it was materialized into
#[derive(Debug, Clone)]
pub struct TreeLayerBinding {
    pub node: TreeLayer,
    pub layer: LayerHandle,
}

pub struct NgwWebMapAdapter {
    context: ResolveContext,
    resource: Option<ResourceId>,
    settings: Mutex<Option<WebMapSettings>>,
    layers: Mutex<Vec<TreeLayerBinding>>,
}

impl NgwWebMapAdapter {
    pub fn layers(&self) -> Vec<TreeLayerBinding> {
        self.layers.lock().clone()
    }

    pub fn tree(&self) -> Option<TreeGroup> {
        self.settings
            .lock()
            .as_ref()
            .and_then(|settings| settings.root_item.clone())
    }

    async fn load_settings(&self, resource: ResourceId) -> Result<WebMapSettings> {
        let cached = self.settings.lock().clone();
        if let Some(settings) = cached {
            return Ok(settings);
        }

        let item = self.context.connector().resource_item(resource).await?;
        let settings = item.webmap.ok_or_else(|| {
            WebMapError::InvalidOptions(format!("resource {} is not a web map", resource))
        })?;
        *self.settings.lock() = Some(settings.clone());
        Ok(settings)
    }

    fn resource_from(&self, options: &LayerOptions) -> Result<ResourceId> {
        self.resource
            .or_else(|| options.extra.get("resourceId").and_then(|v| v.as_u64()))
            .ok_or_else(|| WebMapError::InvalidOptions("web map layer requires a resourceId".into()))
    }
}

#[async_trait]
impl LayerAdapter for NgwWebMapAdapter {
    async fn add_layer(&self, options: &LayerOptions) -> Result<NativeLayer> {
        let map = self.context.map().ok_or(WebMapError::MapNotCreated)?;
        let resource = self.resource_from(options)?;
        let settings = self.load_settings(resource).await?;

        let root = settings.root_item.clone().unwrap_or_default();
        if !root.is_well_formed() {
            log::warn!("web map {} has a nested root item", resource);
        }

        let prefix = options.id.clone().unwrap_or_else(|| resource.to_string());
        let mut bindings = Vec::new();
        for (index, node) in root.layers().into_iter().enumerate() {
            let ngw = NgwLayerOptions {
                resource_id: node.layer_style_id,
                adapter: node.layer_adapter.as_deref().and_then(|a| a.parse().ok()),
                id: None,
            };
            let mut child = LayerOptions::new()
                .with_id(&format!("{}/{}", prefix, index))
                .with_visibility(false);
            (child.min_zoom, child.max_zoom) = node.zoom_range();

            let factory = resolve(ngw, self.context.clone());
            match map.add_layer_from_async_adapter(factory, child, None).await {
                Ok(layer) => {
                    if let Some(opacity) = node.opacity() {
                        map.set_layer_opacity(&layer, opacity);
                    }
                    bindings.push(TreeLayerBinding {
                        node: node.clone(),
                        layer,
                    });
                }
                Err(WebMapError::AdapterNotFound(_)) => log::warn!(
                    "tree layer with style {} has nothing to render",
                    node.layer_style_id
                ),
                Err(e) => log::warn!("tree layer with style {} skipped: {}", node.layer_style_id, e),
            }
        }

        log::debug!("web map {} materialized {} layers", resource, bindings.len());
        *self.layers.lock() = bindings;
        Ok(NativeHandle::new(WebMapTree { resource, settings }))
    }

    async fn extent(&self) -> Option<LngLatBounds> {
        self.settings.lock().as_ref().and_then(|s| s.extent())
    }

    fn remove_layer(&self, _layer: &NativeLayer) -> EventHandled {
        let bindings: Vec<TreeLayerBinding> = self.layers.lock().drain(..).collect();
        if let Some(map) = self.context.map() {
            for binding in bindings {
                map.remove_layer(&binding.layer);
            }
        }
        EventHandled::Handled
    }

    fn show_layer(&self, _layer: &NativeLayer) -> EventHandled {
        let bindings = self.layers();
        if let Some(map) = self.context.map() {
            for binding in bindings.iter().filter(|b| b.node.layer_enabled) {
                map.show_layer(&binding.layer);
            }
        }
        EventHandled::Handled
    }

    fn hide_layer(&self, _layer: &NativeLayer) -> EventHandled {
        let bindings = self.layers();
        if let Some(map) = self.context.map() {
            for binding in &bindings {
                map.hide_layer(&binding.layer);
            }
        }
        EventHandled::Handled
    }

    crate::impl_layer_adapter_any!();
}

struct NgwWebMapFactory {
    context: ResolveContext,
    resource: Option<ResourceId>,
    settings: Option<WebMapSettings>,
}

impl LayerAdapterFactory for NgwWebMapFactory {
    fn kind(&self) -> AdapterKind {
        webmap_kind()
    }

    fn create(&self, _map: Option<&NativeMap>, _options: &LayerOptions) -> Box<dyn LayerAdapter> {
        Box::new(NgwWebMapAdapter {
            context: self.context.clone(),
            resource: self.resource,
            settings: Mutex::new(self.settings.clone()),
            layers: Mutex::new(Vec::new()),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Factory of web map layers. Without `resource` the web map id is read
/// from the `resourceId` entry of the layer options' `extra`; `settings`
/// spares the fetch when the resource was already loaded.
pub fn webmap_factory(
    context: ResolveContext,
    resource: Option<ResourceId>,
    settings: Option<WebMapSettings>,
) -> AdapterFactory {
    Arc::new(NgwWebMapFactory {
        context,
        resource,
        settings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{builder::WebMapBuilder, map::WebMap},
        ngw::{
            connector::MemoryConnector,
            resource::{ResourceCls, ResourceItem},
            tree::TreeItem,
        },
    };

    fn webmap_settings() -> WebMapSettings {
        WebMapSettings {
            extent_left: Some(30.0),
            extent_right: Some(40.0),
            extent_bottom: Some(50.0),
            extent_top: Some(60.0),
            root_item: Some(TreeGroup::new(vec![
                TreeItem::Layer(TreeLayer::new(20).enabled(true)),
                TreeItem::Group(TreeGroup::new(vec![
                    TreeItem::Layer(
                        TreeLayer::new(21)
                            .enabled(false)
                            .with_adapter("tile")
                            .with_scale_range(Some(545_978.773_465_5), None),
                    ),
                    TreeItem::Layer(TreeLayer::new(404).enabled(true)),
                ])),
            ])),
        }
    }

    async fn webmap_with_layers() -> (WebMap, LayerHandle) {
        let map = WebMapBuilder::new().build_and_create().await.unwrap();
        let connector = Arc::new(
            MemoryConnector::new()
                .with_item(ResourceItem::new(3, ResourceCls::Webmap).with_webmap(webmap_settings()))
                .with_item(ResourceItem::new(20, ResourceCls::RasterStyle).with_parent(10))
                .with_item(ResourceItem::new(21, ResourceCls::QgisVectorStyle).with_parent(11))
                .with_item(ResourceItem::new(404, ResourceCls::ResourceGroup)),
        );
        let context = ResolveContext::new(&map, "https://ngw.example", connector);

        let layer = map
            .add_layer(
                webmap_factory(context, Some(3), None),
                LayerOptions::new().with_id("webmap"),
            )
            .await
            .unwrap();
        (map, layer)
    }

    #[tokio::test]
    async fn test_tree_layers_become_map_layers() {
        let (map, layer) = webmap_with_layers().await;

        let mut ids = map.get_layers();
        ids.sort();
        assert_eq!(ids, vec!["webmap", "webmap/0", "webmap/1"]);

        let adapter = layer.adapter_as::<NgwWebMapAdapter>().unwrap();
        let bindings = adapter.layers();
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[1].layer.kind(), &AdapterKind::Tile);
        let zoomed = bindings[1].layer.options();
        assert!((zoomed.max_zoom.unwrap() - 10.0).abs() < 1e-6);
        assert_eq!(zoomed.min_zoom, Some(0.0));
        assert_eq!(adapter.tree().unwrap().layers().len(), 3);
        assert_eq!(
            adapter.extent().await,
            Some(LngLatBounds::new(30.0, 50.0, 40.0, 60.0))
        );
    }

    #[tokio::test]
    async fn test_visibility_follows_enabled_flags() {
        let (map, layer) = webmap_with_layers().await;

        map.show_layer(&layer);
        assert!(map.is_layer_visible("webmap/0"));
        assert!(!map.is_layer_visible("webmap/1"));

        map.hide_layer(&layer);
        assert!(!map.is_layer_visible("webmap/0"));

        map.remove_layer(&layer);
        assert!(map.get_layers().is_empty());
    }
}

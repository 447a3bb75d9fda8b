//! Asynchronous selection of the layer adapter for an NGW resource.
//!
//! Resolution fetches the resource, classifies it and builds the matching
//! factory, recursing into the first child style when the resource cannot
//! be drawn by itself. Styles are taken in server order, so a server that
//! lists them non-deterministically makes the selection non-deterministic.

use crate::{
    core::map::{WeakWebMap, WebMap},
    layers::{base::AdapterKind, factory::AdapterFactory},
    ngw::{
        adapters::{geojson_factory, raster_factory},
        classify::{classify, fallback, Classification, NgwAdapterType},
        connector::ResourceConnector,
        mixin::{compose, ResourceBinding},
        resource::ResourceId,
        webmap_layer::webmap_factory,
    },
    prelude::Arc,
};
use futures::future::BoxFuture;

/// Which resource to draw, and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NgwLayerOptions {
    pub resource_id: ResourceId,
    pub adapter: Option<NgwAdapterType>,
    /// Id of the resulting map layer
    pub id: Option<String>,
}

impl NgwLayerOptions {
    pub fn new(resource_id: ResourceId) -> Self {
        Self {
            resource_id,
            adapter: None,
            id: None,
        }
    }

    pub fn with_adapter(mut self, adapter: NgwAdapterType) -> Self {
        self.adapter = Some(adapter);
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }
}

/// Map, server and connector a resolution runs against
#[derive(Clone)]
pub struct ResolveContext {
    map: WeakWebMap,
    base_url: String,
    connector: Arc<dyn ResourceConnector>,
}

impl ResolveContext {
    pub fn new(map: &WebMap, base_url: &str, connector: Arc<dyn ResourceConnector>) -> Self {
        Self {
            map: map.downgrade(),
            base_url: base_url.trim_end_matches('/').to_string(),
            connector,
        }
    }

    /// `None` once the map was dropped
    pub fn map(&self) -> Option<WebMap> {
        self.map.upgrade()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn connector(&self) -> &Arc<dyn ResourceConnector> {
        &self.connector
    }

    fn base_factory(&self, kind: AdapterKind) -> Option<AdapterFactory> {
        let factory = self.map()?.get_layer_adapter(&kind);
        if factory.is_none() {
            log::warn!("map engine has no {} adapter", kind);
        }
        factory
    }
}

/// Resolves the factory drawing `options.resource_id`.
///
/// Yields `None` when the resource has no renderable representation. A
/// failed resource fetch is not an error: the adapter is then chosen from
/// the hint alone.
pub fn resolve(
    options: NgwLayerOptions,
    context: ResolveContext,
) -> BoxFuture<'static, Option<AdapterFactory>> {
    Box::pin(async move {
        let id = options.resource_id;
        let item = match context.connector.resource_item(id).await {
            Ok(item) => Some(item),
            Err(e) => {
                log::warn!(
                    "resource {} unavailable ({}), choosing adapter from hint {:?}",
                    id,
                    e,
                    options.adapter
                );
                None
            }
        };

        let classification = match &item {
            Some(item) => classify(item, options.adapter),
            None => fallback(id, options.adapter),
        };
        log::debug!("resource {} classified as {:?}", id, classification);

        let factory = match classification {
            Classification::NeedsStyle { parent } => {
                return resolve_first_style(parent, options, context).await;
            }
            Classification::Unknown => return None,
            Classification::WebMap => webmap_factory(
                context.clone(),
                Some(id),
                item.as_ref().and_then(|item| item.webmap.clone()),
            ),
            Classification::GeoJson { resource } => geojson_factory(
                context.base_factory(AdapterKind::GeoJson)?,
                resource,
                context.connector.clone(),
            ),
            Classification::Raster { resource } => {
                let kind = match options.adapter {
                    Some(NgwAdapterType::Tile) => AdapterKind::Tile,
                    _ => AdapterKind::Image,
                };
                raster_factory(context.base_factory(kind)?, &context.base_url, resource)
            }
        };

        Some(compose(
            factory,
            ResourceBinding::new(item, context.connector.clone()),
        ))
    })
}

async fn resolve_first_style(
    parent: ResourceId,
    options: NgwLayerOptions,
    context: ResolveContext,
) -> Option<AdapterFactory> {
    let children = match context.connector.resource_children(parent).await {
        Ok(children) => children,
        Err(e) => {
            log::warn!("styles of resource {} unavailable: {}", parent, e);
            return None;
        }
    };

    let style = match children.first() {
        Some(style) => style.id(),
        None => {
            log::debug!("resource {} has no style to render", parent);
            return None;
        }
    };

    resolve(
        NgwLayerOptions {
            resource_id: style,
            ..options
        },
        context,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::builder::WebMapBuilder,
        ngw::{
            adapters::{NgwGeoJsonAdapter, NgwRasterAdapter},
            connector::{ConnectorCall, MemoryConnector},
            mixin::ResourceAdapterFactory,
            resource::{ResourceCls, ResourceItem},
        },
    };

    fn context(map: &WebMap, connector: Arc<MemoryConnector>) -> ResolveContext {
        ResolveContext::new(map, "https://ngw.example/", connector)
    }

    fn binding_of(factory: &AdapterFactory) -> Option<ResourceId> {
        factory
            .as_any()
            .downcast_ref::<ResourceAdapterFactory>()
            .and_then(|f| f.binding().item.as_ref().map(|item| item.id()))
    }

    #[tokio::test]
    async fn test_vector_layer_without_hint_is_geojson() {
        let map = WebMapBuilder::new().build();
        let connector =
            Arc::new(MemoryConnector::new().with_item(ResourceItem::new(5, ResourceCls::VectorLayer)));

        let factory = resolve(NgwLayerOptions::new(5), context(&map, connector.clone()))
            .await
            .unwrap();
        assert_eq!(factory.kind(), AdapterKind::GeoJson);
        assert_eq!(binding_of(&factory), Some(5));
        assert_eq!(connector.calls(), vec![ConnectorCall::Item(5)]);

        let adapter = factory.create(None, &Default::default());
        let adapter = adapter
            .as_any()
            .downcast_ref::<crate::ngw::mixin::ResourceAdapter>()
            .unwrap();
        assert!(adapter.inner_as::<NgwGeoJsonAdapter>().is_some());
    }

    #[tokio::test]
    async fn test_raster_layer_recurses_into_first_style() {
        let map = WebMapBuilder::new().build();
        let connector = Arc::new(
            MemoryConnector::new()
                .with_item(ResourceItem::new(9, ResourceCls::RasterLayer).with_parent(1))
                .with_item(ResourceItem::new(20, ResourceCls::RasterStyle).with_parent(9))
                .with_item(ResourceItem::new(21, ResourceCls::RasterStyle).with_parent(9)),
        );

        let factory = resolve(NgwLayerOptions::new(9), context(&map, connector.clone()))
            .await
            .unwrap();
        assert_eq!(factory.kind(), AdapterKind::Image);
        assert_eq!(binding_of(&factory), Some(20));
        assert_eq!(
            connector.calls(),
            vec![
                ConnectorCall::Item(9),
                ConnectorCall::Children(9),
                ConnectorCall::Item(20)
            ]
        );

        let adapter = factory.create(None, &Default::default());
        let adapter = adapter
            .as_any()
            .downcast_ref::<crate::ngw::mixin::ResourceAdapter>()
            .unwrap();
        let raster = adapter.inner_as::<NgwRasterAdapter>().unwrap();
        assert_eq!(raster.url(), "https://ngw.example/api/component/render/image");
    }

    #[tokio::test]
    async fn test_raster_layer_without_styles_yields_nothing() {
        let map = WebMapBuilder::new().build();
        let connector =
            Arc::new(MemoryConnector::new().with_item(ResourceItem::new(9, ResourceCls::RasterLayer)));

        assert!(resolve(NgwLayerOptions::new(9), context(&map, connector))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_fetch_failure_falls_back_to_hint() {
        let map = WebMapBuilder::new().build();
        let connector = Arc::new(MemoryConnector::new().failing_on(7));

        let options = NgwLayerOptions::new(7).with_adapter(NgwAdapterType::GeoJson);
        let factory = resolve(options, context(&map, connector.clone()))
            .await
            .unwrap();
        assert_eq!(factory.kind(), AdapterKind::GeoJson);
        assert_eq!(binding_of(&factory), None);
        assert_eq!(connector.calls(), vec![ConnectorCall::Item(7)]);

        let factory = resolve(NgwLayerOptions::new(7), context(&map, connector))
            .await
            .unwrap();
        assert_eq!(factory.kind(), AdapterKind::Image);
    }

    #[tokio::test]
    async fn test_vector_layer_with_tile_hint_uses_style() {
        let map = WebMapBuilder::new().build();
        let connector = Arc::new(
            MemoryConnector::new()
                .with_item(ResourceItem::new(5, ResourceCls::VectorLayer))
                .with_item(ResourceItem::new(6, ResourceCls::MapserverStyle).with_parent(5)),
        );

        let options = NgwLayerOptions::new(5).with_adapter(NgwAdapterType::Tile);
        let factory = resolve(options, context(&map, connector)).await.unwrap();
        assert_eq!(factory.kind(), AdapterKind::Tile);
        assert_eq!(binding_of(&factory), Some(6));
    }

    #[tokio::test]
    async fn test_unknown_class_and_dropped_map() {
        let map = WebMapBuilder::new().build();
        let connector = Arc::new(
            MemoryConnector::new()
                .with_item(ResourceItem::new(1, ResourceCls::ResourceGroup))
                .with_item(ResourceItem::new(5, ResourceCls::VectorLayer)),
        );
        let ctx = context(&map, connector);

        assert!(resolve(NgwLayerOptions::new(1), ctx.clone()).await.is_none());
        drop(map);
        assert!(resolve(NgwLayerOptions::new(5), ctx).await.is_none());
    }
}

//! Resource capability composed onto resolved layer adapters.
//!
//! Any factory can be wrapped so that the adapters it creates also expose the
//! resource item and the connector they were resolved against. Rendering
//! adapters need no knowledge of NGW for this.

use crate::{
    core::{
        adapter::{NativeLayer, NativeMap},
        geo::LngLatBounds,
    },
    layers::{
        base::{AdapterKind, EventHandled, LayerAdapter, LayerEntry, LayerOptions},
        factory::{AdapterFactory, LayerAdapterFactory},
    },
    ngw::{
        connector::ResourceConnector,
        resource::{ResourceId, ResourceItem},
    },
    prelude::Arc,
    Result,
};
use async_trait::async_trait;
use std::any::Any;

/// Resource metadata an adapter was resolved against
pub trait NgwResource {
    /// `None` when the resource could not be fetched during resolution
    fn resource_item(&self) -> Option<&ResourceItem>;

    fn connector(&self) -> &Arc<dyn ResourceConnector>;

    fn resource_id(&self) -> Option<ResourceId> {
        self.resource_item().map(|item| item.id())
    }
}

#[derive(Clone)]
pub struct ResourceBinding {
    pub item: Option<ResourceItem>,
    pub connector: Arc<dyn ResourceConnector>,
}

impl ResourceBinding {
    pub fn new(item: Option<ResourceItem>, connector: Arc<dyn ResourceConnector>) -> Self {
        Self { item, connector }
    }
}

/// Layer adapter carrying a [`ResourceBinding`] next to the wrapped adapter
pub struct ResourceAdapter {
    inner: Box<dyn LayerAdapter>,
    binding: ResourceBinding,
}

impl ResourceAdapter {
    pub fn inner(&self) -> &dyn LayerAdapter {
        self.inner.as_ref()
    }

    pub fn inner_as<T: Any>(&self) -> Option<&T> {
        self.inner.as_any().downcast_ref::<T>()
    }
}

impl NgwResource for ResourceAdapter {
    fn resource_item(&self) -> Option<&ResourceItem> {
        self.binding.item.as_ref()
    }

    fn connector(&self) -> &Arc<dyn ResourceConnector> {
        &self.binding.connector
    }
}

#[async_trait]
impl LayerAdapter for ResourceAdapter {
    async fn add_layer(&self, options: &LayerOptions) -> Result<NativeLayer> {
        self.inner.add_layer(options).await
    }

    async fn extent(&self) -> Option<LngLatBounds> {
        self.inner.extent().await
    }

    crate::forward_vector_capability!(inner);

    fn before_remove(&self) {
        self.inner.before_remove()
    }

    fn remove_layer(&self, layer: &NativeLayer) -> EventHandled {
        self.inner.remove_layer(layer)
    }

    fn show_layer(&self, layer: &NativeLayer) -> EventHandled {
        self.inner.show_layer(layer)
    }

    fn hide_layer(&self, layer: &NativeLayer) -> EventHandled {
        self.inner.hide_layer(layer)
    }

    crate::impl_layer_adapter_any!();
}

/// Factory producing [`ResourceAdapter`]s around another factory's adapters
pub struct ResourceAdapterFactory {
    inner: AdapterFactory,
    binding: ResourceBinding,
}

impl ResourceAdapterFactory {
    pub fn binding(&self) -> &ResourceBinding {
        &self.binding
    }
}

impl LayerAdapterFactory for ResourceAdapterFactory {
    fn kind(&self) -> AdapterKind {
        self.inner.kind()
    }

    fn create(&self, map: Option<&NativeMap>, options: &LayerOptions) -> Box<dyn LayerAdapter> {
        Box::new(ResourceAdapter {
            inner: self.inner.create(map, options),
            binding: self.binding.clone(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Attaches `binding` to the adapters `factory` creates.
///
/// A factory that already carries a binding is returned unchanged.
pub fn compose(factory: AdapterFactory, binding: ResourceBinding) -> AdapterFactory {
    if factory.as_any().is::<ResourceAdapterFactory>() {
        return factory;
    }
    Arc::new(ResourceAdapterFactory {
        inner: factory,
        binding,
    })
}

/// Resource capability of a registered layer, if it was resolved from NGW
pub fn resource_of(layer: &LayerEntry) -> Option<&dyn NgwResource> {
    layer
        .adapter_as::<ResourceAdapter>()
        .map(|adapter| adapter as &dyn NgwResource)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        layers::{factory::FnAdapterFactory, tile::TileAdapter},
        ngw::{connector::MemoryConnector, resource::ResourceCls},
    };

    fn tile_factory() -> AdapterFactory {
        FnAdapterFactory::shared(AdapterKind::Tile, |_, _| Box::new(TileAdapter::new()))
    }

    #[test]
    fn test_compose_is_idempotent() {
        let connector: Arc<dyn ResourceConnector> = Arc::new(MemoryConnector::new());
        let first = ResourceBinding::new(
            Some(ResourceItem::new(20, ResourceCls::RasterStyle)),
            connector.clone(),
        );
        let second = ResourceBinding::new(
            Some(ResourceItem::new(99, ResourceCls::RasterStyle)),
            connector,
        );

        let once = compose(tile_factory(), first);
        let twice = compose(once.clone(), second);
        assert!(Arc::ptr_eq(&once, &twice));
        assert_eq!(twice.kind(), AdapterKind::Tile);

        let adapter = twice.create(None, &LayerOptions::new());
        let adapter = adapter
            .as_any()
            .downcast_ref::<ResourceAdapter>()
            .unwrap();
        assert_eq!(adapter.resource_id(), Some(20));
        assert!(adapter.inner_as::<TileAdapter>().is_some());
        assert!(adapter.inner_as::<ResourceAdapter>().is_none());
    }
}

use crate::{
    core::adapter::NativeMap,
    layers::base::{AdapterKind, LayerAdapter, LayerOptions},
    prelude::{Arc, HashMap},
};
use futures::future::BoxFuture;
use std::any::Any;
use std::fmt;

/// Builds layer adapters of one kind.
///
/// Factories are what the adapter registry stores; every `add_layer` call
/// instantiates a fresh adapter through one.
pub trait LayerAdapterFactory: Send + Sync {
    fn kind(&self) -> AdapterKind;

    /// Instantiates an adapter for the given native map and layer options
    fn create(&self, map: Option<&NativeMap>, options: &LayerOptions) -> Box<dyn LayerAdapter>;

    fn as_any(&self) -> &dyn Any;
}

pub type AdapterFactory = Arc<dyn LayerAdapterFactory>;

type CreateFn = dyn Fn(Option<&NativeMap>, &LayerOptions) -> Box<dyn LayerAdapter> + Send + Sync;

/// Factory backed by a closure
pub struct FnAdapterFactory {
    kind: AdapterKind,
    create: Box<CreateFn>,
}

impl FnAdapterFactory {
    pub fn new<F>(kind: AdapterKind, create: F) -> Self
    where
        F: Fn(Option<&NativeMap>, &LayerOptions) -> Box<dyn LayerAdapter> + Send + Sync + 'static,
    {
        Self {
            kind,
            create: Box::new(create),
        }
    }

    pub fn shared<F>(kind: AdapterKind, create: F) -> AdapterFactory
    where
        F: Fn(Option<&NativeMap>, &LayerOptions) -> Box<dyn LayerAdapter> + Send + Sync + 'static,
    {
        Arc::new(Self::new(kind, create))
    }
}

impl LayerAdapterFactory for FnAdapterFactory {
    fn create(&self, map: Option<&NativeMap>, options: &LayerOptions) -> Box<dyn LayerAdapter> {
        (self.create)(map, options)
    }

    crate::impl_factory_boilerplate!(kind);
}

/// Registry of layer adapter factories keyed by kind.
///
/// Seeded from the map adapter, then extended by starter kits.
#[derive(Default, Clone)]
pub struct AdapterRegistry {
    factories: HashMap<AdapterKind, AdapterFactory>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_factories(factories: impl IntoIterator<Item = AdapterFactory>) -> Self {
        let mut registry = Self::new();
        for factory in factories {
            registry.register(factory);
        }
        registry
    }

    /// Registers a factory under its own kind, replacing any previous one
    pub fn register(&mut self, factory: AdapterFactory) -> Option<AdapterFactory> {
        self.factories.insert(factory.kind(), factory)
    }

    /// Registers a factory under an explicit kind
    pub fn register_as(&mut self, kind: AdapterKind, factory: AdapterFactory) -> Option<AdapterFactory> {
        self.factories.insert(kind, factory)
    }

    pub fn get(&self, kind: &AdapterKind) -> Option<AdapterFactory> {
        self.factories.get(kind).cloned()
    }

    pub fn contains(&self, kind: &AdapterKind) -> bool {
        self.factories.contains_key(kind)
    }

    pub fn kinds(&self) -> Vec<AdapterKind> {
        self.factories.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

/// What `add_layer` is asked to use: a registered kind, a concrete factory,
/// or a factory still being resolved.
pub enum AdapterRef {
    Kind(AdapterKind),
    Factory(AdapterFactory),
    Pending(BoxFuture<'static, Option<AdapterFactory>>),
}

impl AdapterRef {
    pub fn pending<F>(future: F) -> Self
    where
        F: std::future::Future<Output = Option<AdapterFactory>> + Send + 'static,
    {
        AdapterRef::Pending(Box::pin(future))
    }
}

impl From<AdapterKind> for AdapterRef {
    fn from(kind: AdapterKind) -> Self {
        AdapterRef::Kind(kind)
    }
}

impl From<&str> for AdapterRef {
    fn from(name: &str) -> Self {
        match name.parse::<AdapterKind>() {
            Ok(kind) => AdapterRef::Kind(kind),
            Err(never) => match never {},
        }
    }
}

impl From<AdapterFactory> for AdapterRef {
    fn from(factory: AdapterFactory) -> Self {
        AdapterRef::Factory(factory)
    }
}

impl fmt::Debug for AdapterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterRef::Kind(kind) => f.debug_tuple("Kind").field(kind).finish(),
            AdapterRef::Factory(factory) => f.debug_tuple("Factory").field(&factory.kind()).finish(),
            AdapterRef::Pending(_) => f.write_str("Pending"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::tile::TileAdapter;

    #[test]
    fn test_registry_replaces_same_kind() {
        let mut registry = AdapterRegistry::new();
        let first = FnAdapterFactory::shared(AdapterKind::Tile, |_, _| Box::new(TileAdapter::new()));
        let second = FnAdapterFactory::shared(AdapterKind::Tile, |_, _| Box::new(TileAdapter::new()));

        assert!(registry.register(first).is_none());
        assert!(registry.register(second.clone()).is_some());
        assert_eq!(registry.len(), 1);
        assert!(Arc::ptr_eq(&registry.get(&AdapterKind::Tile).unwrap(), &second));
        assert!(registry.get(&AdapterKind::GeoJson).is_none());
    }

    #[test]
    fn test_adapter_ref_from_name() {
        match AdapterRef::from("geojson") {
            AdapterRef::Kind(kind) => assert_eq!(kind, AdapterKind::GeoJson),
            other => panic!("unexpected {:?}", other),
        }
    }
}

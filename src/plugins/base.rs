use crate::{
    core::map::WebMap,
    layers::{base::AdapterKind, factory::AdapterFactory},
    prelude::Arc,
    Result,
};
use async_trait::async_trait;

/// Supplies one extra layer adapter kind to a map.
#[async_trait]
pub trait LayerAdapterProvider: Send + Sync {
    /// Kind the produced factory is registered under
    fn name(&self) -> AdapterKind;

    /// Builds the factory for `map`; `None` registers nothing
    async fn create_adapter(&self, map: &WebMap) -> Result<Option<AdapterFactory>>;
}

/// Extension bundle plugged into a map at creation.
///
/// During [`WebMap::create`] the map first registers every provider of every
/// kit (a failure aborts creation), then runs each kit's `on_load_sync` hook
/// (a failure is logged and ignored).
#[async_trait]
pub trait StarterKit: Send + Sync {
    fn name(&self) -> &str;

    async fn layer_adapters(&self) -> Result<Vec<Arc<dyn LayerAdapterProvider>>> {
        Ok(Vec::new())
    }

    async fn on_load_sync(&self, _map: &WebMap) -> Result<()> {
        Ok(())
    }
}

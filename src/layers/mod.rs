pub mod base;
pub mod factory;
pub mod image;
pub mod macros;
pub mod manager;
pub mod marker;
pub mod tile;
pub mod vector;

pub use base::{
    AdapterKind, DataLayerFilter, EventHandled, LayerAdapter, LayerEntry, LayerHandle,
    LayerOptions, VectorLayerAdapter,
};
pub use factory::{AdapterFactory, AdapterRef, AdapterRegistry, FnAdapterFactory, LayerAdapterFactory};
pub use manager::LayerRegistry;

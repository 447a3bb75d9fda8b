//! NextGIS Web kit: resolves server resources into layer adapters.

pub mod adapters;
pub mod classify;
pub mod connector;
pub mod http;
pub mod kit;
pub mod mixin;
pub mod resolver;
pub mod resource;
pub mod tree;
pub mod webmap_layer;

pub use classify::{classify, Classification, NgwAdapterType};
pub use connector::{ConnectorCall, ConnectorError, MemoryConnector, ResourceConnector};
pub use http::{Credentials, HttpConnector};
pub use kit::{NgwKit, NgwKitOptions, ResourceDef};
pub use mixin::{compose, resource_of, NgwResource, ResourceAdapter, ResourceBinding};
pub use resolver::{resolve, NgwLayerOptions, ResolveContext};
pub use resource::{ResourceCls, ResourceId, ResourceItem, WebMapSettings};
pub use tree::{TreeGroup, TreeItem, TreeLayer};
pub use webmap_layer::{webmap_kind, NgwWebMapAdapter, WEBMAP_ADAPTER};

//! Access to NGW resources.
//!
//! The resolver only talks to [`ResourceConnector`]; [`HttpConnector`]
//! implements it over the REST API and [`MemoryConnector`] serves a fixed
//! resource set.
//!
//! [`HttpConnector`]: crate::ngw::http::HttpConnector

use crate::{
    data::geojson::GeoJson,
    ngw::resource::{ResourceId, ResourceItem},
    prelude::{HashMap, HashSet},
};
use async_trait::async_trait;
use parking_lot::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error("resource {0} not found")]
    NotFound(ResourceId),

    /// Transport failures and bodies that do not decode
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("connector unavailable: {0}")]
    Unavailable(String),
}

pub type ConnectorResult<T> = std::result::Result<T, ConnectorError>;

#[async_trait]
pub trait ResourceConnector: Send + Sync {
    /// `resource.item`: descriptor of one resource
    async fn resource_item(&self, id: ResourceId) -> ConnectorResult<ResourceItem>;

    /// `resource.collection`: children of `parent`, in server order
    async fn resource_children(&self, parent: ResourceId) -> ConnectorResult<Vec<ResourceItem>>;

    /// Features of a vector layer
    async fn feature_layer_geojson(&self, id: ResourceId) -> ConnectorResult<GeoJson>;
}

/// Request received by a [`MemoryConnector`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorCall {
    Item(ResourceId),
    Children(ResourceId),
    GeoJson(ResourceId),
}

#[derive(Default)]
struct MemoryStore {
    items: HashMap<ResourceId, ResourceItem>,
    children: HashMap<ResourceId, Vec<ResourceId>>,
    features: HashMap<ResourceId, GeoJson>,
    failing: HashSet<ResourceId>,
}

/// In-memory connector recording every request it serves.
///
/// Children are listed in insertion order under the parent of each item.
#[derive(Default)]
pub struct MemoryConnector {
    store: Mutex<MemoryStore>,
    calls: Mutex<Vec<ConnectorCall>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(self, item: ResourceItem) -> Self {
        self.insert(item);
        self
    }

    pub fn with_features(self, id: ResourceId, data: GeoJson) -> Self {
        self.store.lock().features.insert(id, data);
        self
    }

    /// Every request about `id` fails with [`ConnectorError::Unavailable`]
    pub fn failing_on(self, id: ResourceId) -> Self {
        self.store.lock().failing.insert(id);
        self
    }

    pub fn insert(&self, item: ResourceItem) {
        let mut store = self.store.lock();
        let id = item.id();
        if let Some(parent) = item.parent_id() {
            let children = store.children.entry(parent).or_default();
            if !children.contains(&id) {
                children.push(id);
            }
        }
        store.items.insert(id, item);
    }

    pub fn calls(&self) -> Vec<ConnectorCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn record(&self, call: ConnectorCall, id: ResourceId) -> ConnectorResult<()> {
        self.calls.lock().push(call);
        if self.store.lock().failing.contains(&id) {
            return Err(ConnectorError::Unavailable(format!("resource {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceConnector for MemoryConnector {
    async fn resource_item(&self, id: ResourceId) -> ConnectorResult<ResourceItem> {
        self.record(ConnectorCall::Item(id), id)?;
        self.store
            .lock()
            .items
            .get(&id)
            .cloned()
            .ok_or(ConnectorError::NotFound(id))
    }

    async fn resource_children(&self, parent: ResourceId) -> ConnectorResult<Vec<ResourceItem>> {
        self.record(ConnectorCall::Children(parent), parent)?;
        let store = self.store.lock();
        Ok(store
            .children
            .get(&parent)
            .map(|ids| ids.iter().filter_map(|id| store.items.get(id).cloned()).collect())
            .unwrap_or_default())
    }

    async fn feature_layer_geojson(&self, id: ResourceId) -> ConnectorResult<GeoJson> {
        self.record(ConnectorCall::GeoJson(id), id)?;
        self.store
            .lock()
            .features
            .get(&id)
            .cloned()
            .ok_or(ConnectorError::NotFound(id))
    }
}

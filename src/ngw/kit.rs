//! Starter kit plugging NextGIS Web resources into a [`WebMap`].

use crate::{
    core::map::WebMap,
    layers::{
        base::{AdapterKind, LayerHandle, LayerOptions},
        factory::AdapterFactory,
    },
    ngw::{
        connector::ResourceConnector,
        http::{Credentials, HttpConnector},
        resolver::{resolve, NgwLayerOptions, ResolveContext},
        resource::ResourceId,
        webmap_layer::{webmap_factory, webmap_kind},
    },
    plugins::base::{LayerAdapterProvider, StarterKit},
    prelude::Arc,
    Result, WebMapError,
};
use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

/// Web map to open on load: its resource id, optionally with the id of the
/// resulting map layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceDef {
    Id(ResourceId),
    WithLayerId(ResourceId, String),
}

impl ResourceDef {
    pub fn resource_id(&self) -> ResourceId {
        match self {
            ResourceDef::Id(id) | ResourceDef::WithLayerId(id, _) => *id,
        }
    }

    pub fn layer_id(&self) -> Option<&str> {
        match self {
            ResourceDef::Id(_) => None,
            ResourceDef::WithLayerId(_, layer) => Some(layer),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NgwKitOptions {
    pub base_url: String,
    #[serde(default)]
    pub resource_id: Option<ResourceDef>,
    #[serde(default)]
    pub auth: Option<Credentials>,
}

impl NgwKitOptions {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Default::default()
        }
    }

    pub fn with_resource(mut self, resource: ResourceDef) -> Self {
        self.resource_id = Some(resource);
        self
    }

    pub fn with_auth(mut self, login: &str, password: &str) -> Self {
        self.auth = Some(Credentials {
            login: login.to_string(),
            password: password.to_string(),
        });
        self
    }
}

pub struct NgwKit {
    options: NgwKitOptions,
    connector: Arc<dyn ResourceConnector>,
}

impl NgwKit {
    /// Kit talking to `options.base_url` over HTTP
    pub fn new(options: NgwKitOptions) -> Result<Self> {
        let connector = HttpConnector::new(&options.base_url, options.auth.clone())?;
        Ok(Self::with_connector(options, Arc::new(connector)))
    }

    pub fn with_connector(options: NgwKitOptions, connector: Arc<dyn ResourceConnector>) -> Self {
        Self { options, connector }
    }

    pub fn options(&self) -> &NgwKitOptions {
        &self.options
    }

    pub fn connector(&self) -> &Arc<dyn ResourceConnector> {
        &self.connector
    }

    pub fn context(&self, map: &WebMap) -> ResolveContext {
        ResolveContext::new(map, &self.options.base_url, self.connector.clone())
    }

    /// Resolves the adapter of an NGW resource for `map`
    pub fn resolve(
        &self,
        map: &WebMap,
        options: NgwLayerOptions,
    ) -> BoxFuture<'static, Option<AdapterFactory>> {
        resolve(options, self.context(map))
    }

    /// Adds the resource as a map layer. `Ok(None)` when the resource has no
    /// renderable representation.
    pub async fn add_ngw_layer(
        &self,
        map: &WebMap,
        options: NgwLayerOptions,
        layer: LayerOptions,
    ) -> Result<Option<LayerHandle>> {
        let mut layer = layer;
        if layer.id.is_none() {
            layer.id = options.id.clone();
        }
        let resource = options.resource_id;
        match map
            .add_layer_from_async_adapter(self.resolve(map, options), layer, None)
            .await
        {
            Ok(layer) => Ok(Some(layer)),
            Err(WebMapError::AdapterNotFound(_)) => {
                log::debug!("resource {} has nothing to render", resource);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

struct WebMapProvider {
    base_url: String,
    connector: Arc<dyn ResourceConnector>,
}

#[async_trait]
impl LayerAdapterProvider for WebMapProvider {
    fn name(&self) -> AdapterKind {
        webmap_kind()
    }

    async fn create_adapter(&self, map: &WebMap) -> Result<Option<AdapterFactory>> {
        let context = ResolveContext::new(map, &self.base_url, self.connector.clone());
        Ok(Some(webmap_factory(context, None, None)))
    }
}

#[async_trait]
impl StarterKit for NgwKit {
    fn name(&self) -> &str {
        "ngw-kit"
    }

    async fn layer_adapters(&self) -> Result<Vec<Arc<dyn LayerAdapterProvider>>> {
        Ok(vec![Arc::new(WebMapProvider {
            base_url: self.options.base_url.clone(),
            connector: self.connector.clone(),
        })])
    }

    async fn on_load_sync(&self, map: &WebMap) -> Result<()> {
        let resource = match &self.options.resource_id {
            Some(resource) => resource,
            None => return Ok(()),
        };

        let mut options = LayerOptions::new();
        options.id = resource.layer_id().map(str::to_string);
        options
            .extra
            .insert("resourceId".into(), resource.resource_id().into());

        let layer = map.add_layer(webmap_kind(), options).await?;
        map.show_layer(&layer);
        Ok(())
    }
}

use crate::{
    data::geojson::GeoJson,
    ngw::{
        connector::{ConnectorError, ConnectorResult, ResourceConnector},
        resource::{ResourceId, ResourceItem},
    },
};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

/// Login and password for HTTP basic authentication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

/// Connector over the NextGIS Web REST API
pub struct HttpConnector {
    client: reqwest::Client,
    base_url: String,
    auth: Option<Credentials>,
}

impl HttpConnector {
    pub fn new(base_url: &str, auth: Option<Credentials>) -> ConnectorResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("webmap/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn item_url(&self, id: ResourceId) -> String {
        format!("{}/api/resource/{}", self.base_url, id)
    }

    pub fn children_url(&self, parent: ResourceId) -> String {
        format!("{}/api/resource/?parent={}", self.base_url, parent)
    }

    pub fn geojson_url(&self, id: ResourceId) -> String {
        format!("{}/api/resource/{}/geojson", self.base_url, id)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, id: ResourceId) -> ConnectorResult<T> {
        log::debug!("GET {}", url);
        let mut request = self.client.get(url);
        if let Some(auth) = &self.auth {
            request = request.basic_auth(&auth.login, Some(&auth.password));
        }

        let response = request.send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ConnectorError::NotFound(id));
        }
        if !status.is_success() {
            return Err(ConnectorError::Status(status.as_u16()));
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl ResourceConnector for HttpConnector {
    async fn resource_item(&self, id: ResourceId) -> ConnectorResult<ResourceItem> {
        self.get_json(&self.item_url(id), id).await
    }

    async fn resource_children(&self, parent: ResourceId) -> ConnectorResult<Vec<ResourceItem>> {
        self.get_json(&self.children_url(parent), parent).await
    }

    async fn feature_layer_geojson(&self, id: ResourceId) -> ConnectorResult<GeoJson> {
        self.get_json(&self.geojson_url(id), id).await
    }
}

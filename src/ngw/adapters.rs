//! NGW flavoured layer adapters.
//!
//! Both wrap an adapter of the map engine and only prepare the layer options
//! before the native add: the GeoJSON adapter loads the features of a vector
//! layer, the raster adapter points the engine at the render service.

use crate::{
    core::{adapter::NativeLayer, geo::LngLatBounds},
    layers::{
        base::{AdapterKind, EventHandled, LayerAdapter, LayerOptions},
        factory::{AdapterFactory, FnAdapterFactory},
    },
    ngw::{connector::ResourceConnector, resource::ResourceId},
    prelude::Arc,
    Result, WebMapError,
};
use async_trait::async_trait;

pub fn render_image_url(base_url: &str) -> String {
    format!("{}/api/component/render/image", base_url)
}

pub fn render_tile_url(base_url: &str, resource: ResourceId) -> String {
    format!(
        "{}/api/component/render/tile?z={{z}}&x={{x}}&y={{y}}&resource={}",
        base_url, resource
    )
}

/// Vector layer whose features are loaded from NGW on add
pub struct NgwGeoJsonAdapter {
    inner: Box<dyn LayerAdapter>,
    resource: ResourceId,
    connector: Arc<dyn ResourceConnector>,
}

impl NgwGeoJsonAdapter {
    pub fn inner(&self) -> &dyn LayerAdapter {
        self.inner.as_ref()
    }

    pub fn resource(&self) -> ResourceId {
        self.resource
    }
}

#[async_trait]
impl LayerAdapter for NgwGeoJsonAdapter {
    async fn add_layer(&self, options: &LayerOptions) -> Result<NativeLayer> {
        let data = self
            .connector
            .feature_layer_geojson(self.resource)
            .await
            .map_err(WebMapError::from)?;
        log::debug!("loaded features of resource {}", self.resource);

        let mut options = options.clone();
        options.data = Some(data);
        self.inner.add_layer(&options).await
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

/// Server rendered raster of a style resource
pub struct NgwRasterAdapter {
    inner: Box<dyn LayerAdapter>,
    url: String,
    params: Vec<(String, String)>,
}

impl NgwRasterAdapter {
    pub fn inner(&self) -> &dyn LayerAdapter {
        self.inner.as_ref()
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl LayerAdapter for NgwRasterAdapter {
    async fn add_layer(&self, options: &LayerOptions) -> Result<NativeLayer> {
        let mut options = options.clone().with_url(&self.url);
        for (key, value) in &self.params {
            options = options.with_param(key, value);
        }
        self.inner.add_layer(&options).await
    }

    async fn extent(&self) -> Option<LngLatBounds> {
        self.inner.extent().await
    }

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

/// GeoJSON factory loading the features of `resource` through `connector`.
/// `base` is the engine's GeoJSON factory.
pub fn geojson_factory(
    base: AdapterFactory,
    resource: ResourceId,
    connector: Arc<dyn ResourceConnector>,
) -> AdapterFactory {
    FnAdapterFactory::shared(AdapterKind::GeoJson, move |map, options| {
        Box::new(NgwGeoJsonAdapter {
            inner: base.create(map, options),
            resource,
            connector: connector.clone(),
        })
    })
}

/// Raster factory rendering `resource`. The kind of `base` decides between
/// the tile service and single image requests.
pub fn raster_factory(base: AdapterFactory, base_url: &str, resource: ResourceId) -> AdapterFactory {
    let kind = base.kind();
    let (url, params) = match kind {
        AdapterKind::Tile => (render_tile_url(base_url, resource), Vec::new()),
        _ => (
            render_image_url(base_url),
            vec![("resource".to_string(), resource.to_string())],
        ),
    };
    FnAdapterFactory::shared(kind, move |map, options| {
        Box::new(NgwRasterAdapter {
            inner: base.create(map, options),
            url: url.clone(),
            params: params.clone(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::adapter::NativeHandle,
        data::geojson::{GeoJson, GeoJsonFeature, GeoJsonGeometry},
        layers::{
            image::{ImageAdapter, ImageSource},
            tile::{TileAdapter, TileSource},
            vector::{GeoJsonAdapter, VectorLayerInfo},
        },
        ngw::connector::MemoryConnector,
    };

    #[tokio::test]
    async fn test_geojson_adapter_loads_features() {
        let data = GeoJson::collection(vec![
            GeoJsonFeature::new(GeoJsonGeometry::Point {
                coordinates: [37.6, 55.7],
            }),
            GeoJsonFeature::new(GeoJsonGeometry::Point {
                coordinates: [30.3, 59.9],
            }),
        ]);
        let connector = Arc::new(MemoryConnector::new().with_features(5, data));
        let base = FnAdapterFactory::shared(AdapterKind::GeoJson, |_, _| {
            Box::new(GeoJsonAdapter::new())
        });

        let factory = geojson_factory(base, 5, connector);
        let adapter = factory.create(None, &LayerOptions::new());
        let native = adapter.add_layer(&LayerOptions::new()).await.unwrap();

        assert!(native.downcast_ref::<VectorLayerInfo>().is_some());
        let ngw = adapter.as_any().downcast_ref::<NgwGeoJsonAdapter>().unwrap();
        let inner = ngw.inner().as_any().downcast_ref::<GeoJsonAdapter>().unwrap();
        assert_eq!(inner.feature_count(), 2);
        assert!(adapter.vector().is_some());
    }

    #[tokio::test]
    async fn test_geojson_adapter_surfaces_connector_errors() {
        let connector = Arc::new(MemoryConnector::new());
        let base = FnAdapterFactory::shared(AdapterKind::GeoJson, |_, _| {
            Box::new(GeoJsonAdapter::new())
        });
        let adapter = geojson_factory(base, 5, connector).create(None, &LayerOptions::new());

        let err = adapter.add_layer(&LayerOptions::new()).await.unwrap_err();
        assert!(matches!(err, WebMapError::Connector(_)));
    }

    #[tokio::test]
    async fn test_raster_urls() {
        let image = FnAdapterFactory::shared(AdapterKind::Image, |_, _| Box::new(ImageAdapter::new()));
        let adapter = raster_factory(image, "https://ngw.example", 20).create(None, &LayerOptions::new());
        let native: NativeHandle = adapter.add_layer(&LayerOptions::new()).await.unwrap();
        let source = native.downcast_ref::<ImageSource>().unwrap();
        assert_eq!(source.url, "https://ngw.example/api/component/render/image");
        assert_eq!(
            source.params,
            vec![("resource".to_string(), "20".to_string())]
        );

        let tile = FnAdapterFactory::shared(AdapterKind::Tile, |_, _| Box::new(TileAdapter::new()));
        let factory = raster_factory(tile, "https://ngw.example", 20);
        assert_eq!(factory.kind(), AdapterKind::Tile);
        let native = factory
            .create(None, &LayerOptions::new())
            .add_layer(&LayerOptions::new())
            .await
            .unwrap();
        let source = native.downcast_ref::<TileSource>().unwrap();
        assert_eq!(
            source.url_template,
            "https://ngw.example/api/component/render/tile?z={z}&x={x}&y={y}&resource=20"
        );
    }
}

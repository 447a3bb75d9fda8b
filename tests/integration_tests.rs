use parking_lot::Mutex;
use std::sync::Arc;
use webmap::{
    data::geojson::{GeoJsonFeature, GeoJsonGeometry},
    ngw::{
        resource_of, ConnectorCall, MemoryConnector, NgwAdapterType, NgwKit, NgwKitOptions,
        NgwLayerOptions, ResourceCls, ResourceItem,
    },
    AdapterKind, GeoJson, LayerEvent, LayerOptions, WebMap, WebMapBuilder,
};

/// Integration tests driving the web map through the NGW kit the way an
/// application does, on the headless engine
#[cfg(test)]
mod integration_tests {
    use super::*;

    fn points() -> GeoJson {
        GeoJson::collection(vec![
            GeoJsonFeature::new(GeoJsonGeometry::Point {
                coordinates: [37.6, 55.7],
            })
            .with_id(1),
            GeoJsonFeature::new(GeoJsonGeometry::Point {
                coordinates: [30.3, 59.9],
            })
            .with_id(2),
        ])
    }

    fn server() -> Arc<MemoryConnector> {
        Arc::new(
            MemoryConnector::new()
                .with_item(ResourceItem::new(5, ResourceCls::VectorLayer))
                .with_features(5, points())
                .with_item(ResourceItem::new(9, ResourceCls::RasterLayer).with_parent(1))
                .with_item(ResourceItem::new(20, ResourceCls::RasterStyle).with_parent(9))
                .with_item(ResourceItem::new(11, ResourceCls::RasterLayer))
                .failing_on(7),
        )
    }

    fn kit(connector: Arc<MemoryConnector>) -> NgwKit {
        NgwKit::with_connector(NgwKitOptions::new("https://ngw.example"), connector)
    }

    async fn created_map() -> WebMap {
        WebMapBuilder::new().build_and_create().await.unwrap()
    }

    fn count_events(map: &WebMap, name: &'static str) -> Arc<Mutex<usize>> {
        let count = Arc::new(Mutex::new(0));
        let sink = count.clone();
        map.events().lifecycle.on(move |event: &LayerEvent| {
            if event.name() == name {
                *sink.lock() += 1;
            }
        });
        count
    }

    /// A vector layer without hint is drawn as GeoJSON and added hidden
    #[tokio::test]
    async fn test_vector_layer_scenario() {
        let map = created_map().await;
        let kit = kit(server());

        let factory = kit.resolve(&map, NgwLayerOptions::new(5)).await.unwrap();
        assert_eq!(factory.kind(), AdapterKind::GeoJson);

        let shows = count_events(&map, "layer:show");
        let layer = kit
            .add_ngw_layer(
                &map,
                NgwLayerOptions::new(5).with_id("lyr1"),
                LayerOptions::new(),
            )
            .await
            .unwrap()
            .unwrap();

        assert!(map.get_layers().contains(&"lyr1".to_string()));
        assert!(!map.is_layer_visible("lyr1"));
        assert_eq!(resource_of(&layer).and_then(|r| r.resource_id()), Some(5));

        map.show_layer("lyr1");
        assert!(map.is_layer_visible("lyr1"));
        assert_eq!(*shows.lock(), 1);
    }

    /// A raster layer is rendered through its first style
    #[tokio::test]
    async fn test_raster_layer_scenario() {
        let map = created_map().await;
        let connector = server();
        let kit = kit(connector.clone());

        let layer = kit
            .add_ngw_layer(&map, NgwLayerOptions::new(9), LayerOptions::new().with_id("relief"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(layer.kind(), &AdapterKind::Image);
        assert_eq!(resource_of(&layer).and_then(|r| r.resource_id()), Some(20));
        assert_eq!(
            connector.calls(),
            vec![
                ConnectorCall::Item(9),
                ConnectorCall::Children(9),
                ConnectorCall::Item(20)
            ]
        );
    }

    /// An unreachable resource falls back on the hint without further fetches
    #[tokio::test]
    async fn test_unreachable_resource_scenario() {
        let map = created_map().await;
        let connector = server();
        let kit = kit(connector.clone());

        let options = NgwLayerOptions::new(7).with_adapter(NgwAdapterType::GeoJson);
        let factory = kit.resolve(&map, options).await.unwrap();

        assert_eq!(factory.kind(), AdapterKind::GeoJson);
        assert_eq!(connector.calls(), vec![ConnectorCall::Item(7)]);
    }

    /// A raster layer without styles adds nothing
    #[tokio::test]
    async fn test_raster_without_styles_adds_nothing() {
        let map = created_map().await;
        let preadds = count_events(&map, "layer:preadd");

        let layer = kit(server())
            .add_ngw_layer(&map, NgwLayerOptions::new(11), LayerOptions::new())
            .await
            .unwrap();

        assert!(layer.is_none());
        assert!(map.get_layers().is_empty());
        assert_eq!(*preadds.lock(), 0);
    }

    /// Adding then removing a layer leaves the registry as it was
    #[tokio::test]
    async fn test_add_remove_round_trip() {
        let map = created_map().await;
        map.add_layer("TILE", LayerOptions::new().with_id("osm").with_url("{z}/{x}/{y}"))
            .await
            .unwrap();
        let before = map.get_layers();

        let kit = kit(server());
        let layer = kit
            .add_ngw_layer(&map, NgwLayerOptions::new(5), LayerOptions::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(map.get_layers().len(), 2);

        map.remove_layer(&layer);
        map.remove_layer(&layer);
        assert_eq!(map.get_layers(), before);
    }

    /// Two inversions restore the original visibility
    #[tokio::test]
    async fn test_toggle_twice() {
        let map = created_map().await;
        let layer = kit(server())
            .add_ngw_layer(&map, NgwLayerOptions::new(5), LayerOptions::new().with_visibility(true))
            .await
            .unwrap()
            .unwrap();
        assert!(map.is_layer_visible(&layer));

        map.toggle_layer(&layer, None);
        map.toggle_layer(&layer, None);
        assert!(map.is_layer_visible(&layer));
    }

    /// Selecting features goes through the vector capability of the
    /// resolved layer
    #[tokio::test]
    async fn test_select_ngw_features() {
        let map = created_map().await;
        let layer = kit(server())
            .add_ngw_layer(&map, NgwLayerOptions::new(5).with_id("pts"), LayerOptions::new())
            .await
            .unwrap()
            .unwrap();

        map.select_layer(
            "pts",
            Some(Arc::new(|f: &GeoJsonFeature| f.id == Some(serde_json::json!(2)))),
        );
        assert_eq!(map.get_selected_layers(), vec!["pts".to_string()]);
        assert!(layer.adapter().vector().is_some());
    }
}

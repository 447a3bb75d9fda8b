use crate::{
    core::{
        adapter::{NativeHandle, NativeLayer},
        geo::LngLatBounds,
    },
    data::{
        geojson::{bounds_of, GeoJson, GeoJsonFeature, VectorLayerType},
        paint::Paint,
    },
    input::events::LayerClickEvent,
    layers::base::{
        DataLayerFilter, EventHandled, LayerAdapter, LayerOptions, VectorLayerAdapter,
    },
    Result,
};
use async_trait::async_trait;
use parking_lot::Mutex;

/// Feature stored in a vector layer, with its selection flag
#[derive(Debug, Clone, PartialEq)]
pub struct VectorFeatureData {
    pub feature: GeoJsonFeature,
    pub selected: bool,
}

impl VectorFeatureData {
    pub fn new(feature: GeoJsonFeature) -> Self {
        Self {
            feature,
            selected: false,
        }
    }
}

/// Native vector layer of the headless engine
#[derive(Debug, Clone, PartialEq)]
pub struct VectorLayerInfo {
    pub id: Option<String>,
    pub layer_type: Option<VectorLayerType>,
}

#[derive(Default)]
struct VectorState {
    features: Vec<VectorFeatureData>,
    filter: Option<DataLayerFilter>,
    options: LayerOptions,
}

impl VectorState {
    fn passes(&self, feature: &GeoJsonFeature) -> bool {
        self.filter.as_ref().map_or(true, |f| f(feature))
    }
}

/// GeoJSON layer adapter of the headless engine.
///
/// Keeps the features in memory and implements the whole vector capability:
/// selection, filtering and data replacement.
#[derive(Default)]
pub struct GeoJsonAdapter {
    state: Mutex<VectorState>,
}

impl GeoJsonAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Features passing the current filter
    pub fn features(&self) -> Vec<GeoJsonFeature> {
        let state = self.state.lock();
        state
            .features
            .iter()
            .filter(|f| state.passes(&f.feature))
            .map(|f| f.feature.clone())
            .collect()
    }

    /// Total feature count, filter ignored
    pub fn feature_count(&self) -> usize {
        self.state.lock().features.len()
    }

    /// Get selected features
    pub fn selected_features(&self) -> Vec<GeoJsonFeature> {
        self.state
            .lock()
            .features
            .iter()
            .filter(|f| f.selected)
            .map(|f| f.feature.clone())
            .collect()
    }

    pub fn layer_type(&self) -> Option<VectorLayerType> {
        self.state.lock().options.layer_type
    }

    /// Resolved paint of the feature at `index`, the selected paint when selected
    pub fn paint_for(&self, index: usize) -> Option<Paint> {
        let state = self.state.lock();
        let data = state.features.get(index)?;
        let spec = if data.selected {
            state
                .options
                .selected_paint
                .as_ref()
                .or(state.options.paint.as_ref())
        } else {
            state.options.paint.as_ref()
        };
        spec.map(|s| s.resolve(&data.feature))
    }

    /// Simulates a click on the feature at `index`.
    ///
    /// Selectable layers update their selection first: a second click on a
    /// selected feature unselects it when `unselect_on_second_click` is set,
    /// and without `multiselect` the previous selection is dropped.
    pub fn click(&self, index: usize) -> Option<LayerClickEvent> {
        let (event, callback) = {
            let mut state = self.state.lock();
            if index >= state.features.len() {
                return None;
            }
            let selectable = state.options.selectable;
            let multiselect = state.options.multiselect.unwrap_or(false);
            let unselect_on_second_click = state.options.unselect_on_second_click.unwrap_or(false);

            if selectable {
                let was_selected = state.features[index].selected;
                if was_selected && unselect_on_second_click {
                    state.features[index].selected = false;
                } else {
                    if !multiselect {
                        for data in state.features.iter_mut() {
                            data.selected = false;
                        }
                    }
                    state.features[index].selected = true;
                }
            }

            let data = &state.features[index];
            let event = LayerClickEvent {
                layer_id: state.options.id.clone().unwrap_or_default(),
                feature: Some(data.feature.clone()),
                selected: data.selected,
            };
            (event, state.options.on_layer_click.clone())
        };

        if let Some(callback) = callback {
            callback(&event);
        }
        Some(event)
    }

    fn set_selected(&self, filter: Option<&DataLayerFilter>, selected: bool) {
        let mut state = self.state.lock();
        for data in state.features.iter_mut() {
            if filter.map_or(true, |f| f(&data.feature)) {
                data.selected = selected;
            }
        }
    }

    fn push_data(&self, data: &GeoJson) {
        let features = data.clone().into_features();
        self.state
            .lock()
            .features
            .extend(features.into_iter().map(VectorFeatureData::new));
    }
}

#[async_trait]
impl LayerAdapter for GeoJsonAdapter {
    async fn add_layer(&self, options: &LayerOptions) -> Result<NativeLayer> {
        let layer_type = options.layer_type.or_else(|| {
            options
                .data
                .as_ref()
                .and_then(|d| d.detect_geometry_kind())
                .and_then(|k| k.layer_type())
        });

        {
            let mut state = self.state.lock();
            state.options = options.clone();
            state.options.layer_type = layer_type;
            state.features.clear();
        }
        if let Some(data) = &options.data {
            self.push_data(data);
        }

        log::debug!(
            "geojson layer {:?} created with {} features",
            options.id,
            self.feature_count()
        );

        Ok(NativeHandle::new(VectorLayerInfo {
            id: options.id.clone(),
            layer_type,
        }))
    }

    async fn extent(&self) -> Option<LngLatBounds> {
        let state = self.state.lock();
        bounds_of(
            state
                .features
                .iter()
                .filter(|f| state.passes(&f.feature))
                .filter_map(|f| f.feature.geometry.as_ref()),
        )
    }

    fn vector(&self) -> Option<&dyn VectorLayerAdapter> {
        Some(self)
    }

    crate::impl_layer_adapter_any!();
}

impl VectorLayerAdapter for GeoJsonAdapter {
    fn select(&self, filter: Option<&DataLayerFilter>) -> EventHandled {
        self.set_selected(filter, true);
        EventHandled::Handled
    }

    fn unselect(&self, filter: Option<&DataLayerFilter>) -> EventHandled {
        self.set_selected(filter, false);
        EventHandled::Handled
    }

    fn filter(&self, filter: &DataLayerFilter) -> EventHandled {
        self.state.lock().filter = Some(filter.clone());
        EventHandled::Handled
    }

    fn remove_filter(&self) -> EventHandled {
        self.state.lock().filter = None;
        EventHandled::Handled
    }

    fn set_data(&self, data: &GeoJson) -> EventHandled {
        self.state.lock().features.clear();
        self.push_data(data);
        EventHandled::Handled
    }

    fn add_data(&self, data: &GeoJson) -> EventHandled {
        self.push_data(data);
        EventHandled::Handled
    }

    fn clear_layer(&self, predicate: Option<&DataLayerFilter>) -> EventHandled {
        let mut state = self.state.lock();
        match predicate {
            Some(predicate) => state.features.retain(|f| !predicate(&f.feature)),
            None => state.features.clear(),
        }
        EventHandled::Handled
    }
}

use crate::{
    core::adapter::{NativeHandle, NativeLayer},
    layers::base::{LayerAdapter, LayerOptions},
    Result, WebMapError,
};
use async_trait::async_trait;
use parking_lot::Mutex;

/// Native tile layer of the headless engine: a resolved URL template
#[derive(Debug, Clone, PartialEq)]
pub struct TileSource {
    /// URL template for tiles (e.g., "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png")
    pub url_template: String,
    /// Available subdomains for load balancing
    pub subdomains: Vec<String>,
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
    pub attribution: Option<String>,
}

impl TileSource {
    pub fn from_options(options: &LayerOptions) -> Result<Self> {
        let url = options
            .url
            .clone()
            .ok_or_else(|| WebMapError::InvalidOptions("tile layer requires a url".into()))?;

        let subdomains = options
            .extra
            .get("subdomains")
            .and_then(|v| v.as_str())
            .map(|s| s.chars().map(|c| c.to_string()).collect())
            .unwrap_or_else(|| vec!["a".to_string(), "b".to_string(), "c".to_string()]);

        if let (Some(min), Some(max)) = (options.min_zoom, options.max_zoom) {
            if min > max {
                return Err(WebMapError::InvalidOptions(format!(
                    "tile layer zoom range {}..{} is inverted",
                    min, max
                )));
            }
        }

        Ok(Self {
            url_template: url,
            subdomains,
            min_zoom: options.min_zoom,
            max_zoom: options.max_zoom,
            attribution: options.attribution.clone(),
        })
    }
}

/// Tile layer adapter of the headless engine
#[derive(Default)]
pub struct TileAdapter {
    source: Mutex<Option<TileSource>>,
}

impl TileAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(&self) -> Option<TileSource> {
        self.source.lock().clone()
    }
}

#[async_trait]
impl LayerAdapter for TileAdapter {
    async fn add_layer(&self, options: &LayerOptions) -> Result<NativeLayer> {
        let source = TileSource::from_options(options)?;
        *self.source.lock() = Some(source.clone());
        Ok(NativeHandle::new(source))
    }

    crate::impl_layer_adapter_any!();
}

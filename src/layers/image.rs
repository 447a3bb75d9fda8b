use crate::{
    core::{
        adapter::{NativeHandle, NativeLayer},
        geo::LngLatBounds,
    },
    layers::base::{LayerAdapter, LayerOptions},
    Result, WebMapError,
};
use async_trait::async_trait;
use parking_lot::Mutex;

/// Native single-image layer: a server URL re-requested for every view
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSource {
    pub url: String,
    pub params: Vec<(String, String)>,
    pub attribution: Option<String>,
}

impl ImageSource {
    pub fn from_options(options: &LayerOptions) -> Result<Self> {
        let url = options
            .url
            .clone()
            .ok_or_else(|| WebMapError::InvalidOptions("image layer requires a url".into()))?;
        Ok(Self {
            url,
            params: options.params.clone(),
            attribution: options.attribution.clone(),
        })
    }

    /// URL of the image covering `extent` at the given pixel size
    pub fn request_url(&self, extent: &LngLatBounds, width: u32, height: u32) -> String {
        let mut query: Vec<String> = self
            .params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        query.push(format!(
            "extent={},{},{},{}",
            extent.west, extent.south, extent.east, extent.north
        ));
        query.push(format!("size={},{}", width, height));

        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.url, separator, query.join("&"))
    }
}

/// Image layer adapter of the headless engine
#[derive(Default)]
pub struct ImageAdapter {
    source: Mutex<Option<ImageSource>>,
}

impl ImageAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(&self) -> Option<ImageSource> {
        self.source.lock().clone()
    }
}

#[async_trait]
impl LayerAdapter for ImageAdapter {
    async fn add_layer(&self, options: &LayerOptions) -> Result<NativeLayer> {
        let source = ImageSource::from_options(options)?;
        *self.source.lock() = Some(source.clone());
        Ok(NativeHandle::new(source))
    }

    crate::impl_layer_adapter_any!();
}

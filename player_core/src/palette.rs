use std::future::Future;
use std::sync::Arc;

use prism_theme::{DominantColorExtractor, PaletteParams};
use types::PaletteColor;

use crate::PipelineError;

/// Capability seam for palette extraction.
pub trait PaletteSource {
    fn extract(
        &self,
        image_url: &str,
    ) -> impl Future<Output = Result<Vec<PaletteColor>, PipelineError>> + Send;
}

/// Builds the same-origin proxy URL for a remote image.
///
/// # Errors
/// If the relay base is not a valid absolute URL.
pub fn proxy_url(relay_base: &str, image_url: &str) -> Result<url::Url, PipelineError> {
    let mut proxied = url::Url::parse(relay_base)
        .and_then(|base| base.join("/api/thumbnailUrl"))
        .map_err(|e| PipelineError::InvalidRelayBase(e.to_string()))?;

    proxied.query_pairs_mut().append_pair("url", image_url).finish();

    Ok(proxied)
}

/// Extracts the dominant colors of a remote image.
///
/// The image is always fetched through the media relay rather than from its
/// origin: the downstream pixel consumer needs same-origin access, so the
/// relay indirection is a required dependency edge, not an optimization.
#[derive(Clone)]
pub struct PaletteExtractor {
    http_client: reqwest::Client,
    relay_base: String,
    extractor: Arc<dyn DominantColorExtractor + Send + Sync>,
    params: PaletteParams,
}

impl PaletteExtractor {
    pub fn new(
        http_client: reqwest::Client,
        relay_base: impl Into<String>,
        extractor: Arc<dyn DominantColorExtractor + Send + Sync>,
    ) -> Self {
        Self {
            http_client,
            relay_base: relay_base.into(),
            extractor,
            params: PaletteParams::default(),
        }
    }
}

impl PaletteSource for PaletteExtractor {
    async fn extract(&self, image_url: &str) -> Result<Vec<PaletteColor>, PipelineError> {
        let proxied = proxy_url(&self.relay_base, image_url)?;

        let response = match self.http_client.get(proxied).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("proxied fetch of {} failed: {}", image_url, e);
                return Err(PipelineError::PaletteExtraction(e.to_string()));
            }
        };

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!("reading proxied body of {} failed: {}", image_url, e);
                return Err(PipelineError::PaletteExtraction(e.to_string()));
            }
        };

        let image = match image::load_from_memory(&bytes) {
            Ok(image) => image.to_rgba8(),
            Err(e) => {
                tracing::error!("decoding thumbnail {} failed: {}", image_url, e);
                return Err(PipelineError::PaletteExtraction(e.to_string()));
            }
        };

        Ok(self.extractor.extract(&image, &self.params))
    }
}

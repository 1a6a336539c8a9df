use std::future::Future;

use types::VideoMetadata;

use crate::PipelineError;

/// Public oEmbed endpoint used for production lookups.
pub const DEFAULT_OEMBED_ENDPOINT: &str = "https://youtube.com/oembed";

/// Capability seam for metadata lookup, so the orchestrator can be driven
/// with fakes in tests.
pub trait MetadataSource {
    fn fetch(
        &self,
        video_url: &str,
    ) -> impl Future<Output = Result<VideoMetadata, PipelineError>> + Send;
}

/// Fetches title/author/thumbnail for a video from an oEmbed endpoint.
///
/// One outbound request per call; the JSON body is taken as-is (no schema
/// validation beyond being parseable). The caller surfaces failures without
/// retrying.
#[derive(Debug, Clone)]
pub struct MetadataFetcher {
    http_client: reqwest::Client,
    endpoint: String,
}

impl MetadataFetcher {
    pub fn new(http_client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into(),
        }
    }

    fn request_url(&self, video_url: &str) -> Result<url::Url, PipelineError> {
        let mut request_url = url::Url::parse(&self.endpoint)
            .map_err(|e| PipelineError::MetadataFetch(e.to_string()))?;

        request_url
            .query_pairs_mut()
            .append_pair("url", video_url)
            .append_pair("format", "json")
            .finish();

        Ok(request_url)
    }
}

impl MetadataSource for MetadataFetcher {
    async fn fetch(&self, video_url: &str) -> Result<VideoMetadata, PipelineError> {
        let request_url = self.request_url(video_url)?;

        let response = match self.http_client.get(request_url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("oEmbed request for {} failed: {}", video_url, e);
                return Err(PipelineError::MetadataFetch(e.to_string()));
            }
        };

        match response.json::<VideoMetadata>().await {
            Ok(metadata) => Ok(metadata),
            Err(e) => {
                tracing::error!("oEmbed response for {} was not valid JSON: {}", video_url, e);
                Err(PipelineError::MetadataFetch(e.to_string()))
            }
        }
    }
}

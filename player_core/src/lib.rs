use thiserror::Error;

pub mod metadata;
pub mod palette;
pub mod session;

pub use metadata::{MetadataFetcher, MetadataSource};
pub use palette::{PaletteExtractor, PaletteSource};
pub use session::{AudioSink, Orchestrator, Selection};

/// Failures of the playback pipeline. Surfaced to the caller as-is: no
/// retries, and side effects already applied by earlier stages stay applied.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("metadata fetch failed: {0}")]
    MetadataFetch(String),

    #[error("palette extraction failed: {0}")]
    PaletteExtraction(String),

    #[error("relay URL is not a valid base: {0}")]
    InvalidRelayBase(String),
}

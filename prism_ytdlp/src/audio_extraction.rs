use std::pin::Pin;
use std::process::Stdio;

use bytes::Bytes;
use futures::Stream;
use thiserror::Error;
use tokio::process::Command;
use tokio_util::io::ReaderStream;

/// Audio-only byte stream produced by the extraction capability.
pub type AudioByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

#[derive(Debug, Error)]
pub enum AudioExtractionError {
    #[error("failed to spawn {binary}: {source}")]
    Spawn {
        binary: String,
        source: std::io::Error,
    },

    #[error("extractor produced no stdout pipe")]
    MissingStdout,
}

/// Opaque capability: given a source URL, produce an audio-only byte stream.
pub trait AudioStreamSource {
    /// # Errors
    /// If the extraction process cannot be started, an error is returned.
    /// Failures of the source itself (unsupported URL, upstream rejection)
    /// surface as the stream ending early.
    fn extract_audio(&self, source_url: &str) -> Result<AudioByteStream, AudioExtractionError>;
}

/// Extracts audio by spawning yt-dlp and piping its stdout.
#[derive(Debug, Clone)]
pub struct YtDlpSource {
    binary: String,
}

impl YtDlpSource {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

fn build_command(binary: &str, source_url: &str) -> Command {
    let mut cmd = Command::new(binary);
    cmd.arg("--no-playlist")
        .arg("-f")
        .arg("bestaudio[ext=m4a]/bestaudio")
        .arg("-o")
        .arg("-")
        .arg(source_url)
        .stdout(Stdio::piped())
        .stderr(Stdio::null());

    cmd
}

impl AudioStreamSource for YtDlpSource {
    fn extract_audio(&self, source_url: &str) -> Result<AudioByteStream, AudioExtractionError> {
        tracing::info!("extracting audio stream from {}", source_url);

        let mut child = match build_command(&self.binary, source_url).spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::error!("failed to spawn {}: {}", self.binary, e);
                return Err(AudioExtractionError::Spawn {
                    binary: self.binary.clone(),
                    source: e,
                });
            }
        };

        let stdout = child
            .stdout
            .take()
            .ok_or(AudioExtractionError::MissingStdout)?;

        Ok(Box::pin(ReaderStream::new(stdout)))
    }
}

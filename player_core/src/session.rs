use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use prism_theme::{apply_theme, gradient_stops, ThemeSink};
use types::PlaybackSession;

use crate::metadata::MetadataSource;
use crate::palette::PaletteSource;
use crate::PipelineError;

/// Binding seam for the playback element. The element owns only the most
/// recent source; a replaced binding is discarded, not released.
pub trait AudioSink {
    fn bind_source(&mut self, source: &str);
}

/// Outcome of a selection pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Applied,

    /// A newer selection started while this one was in flight; its results
    /// were discarded without touching the session or the sinks.
    Superseded,
}

/// Builds the same-origin relay URL for a video's audio-only stream.
///
/// # Errors
/// If the relay base is not a valid absolute URL.
pub fn relay_audio_url(relay_base: &str, video_url: &str) -> Result<url::Url, PipelineError> {
    let mut audio_url = url::Url::parse(relay_base)
        .and_then(|base| base.join("/api/ytAudio"))
        .map_err(|e| PipelineError::InvalidRelayBase(e.to_string()))?;

    audio_url.query_pairs_mut().append_pair("url", video_url).finish();

    Ok(audio_url)
}

/// Sequences one selection: metadata, palette, theme, audio binding.
///
/// There is exactly one logical session per playback element. Each pipeline
/// run takes a monotonic sequence number at entry and re-checks it after
/// every suspend point and once more at the commit point, so a slow
/// pipeline's late-arriving theme or audio binding can never overwrite a
/// newer selection. In-flight network calls are not cancelled; their results
/// are simply dropped.
pub struct Orchestrator<M, P, T, A> {
    metadata: M,
    palette: P,
    theme_sink: Mutex<T>,
    audio_sink: Mutex<A>,
    relay_base: String,
    seq: AtomicU64,
    session: Mutex<Option<PlaybackSession>>,
}

impl<M, P, T, A> Orchestrator<M, P, T, A>
where
    M: MetadataSource,
    P: PaletteSource,
    T: ThemeSink,
    A: AudioSink,
{
    pub fn new(
        metadata: M,
        palette: P,
        theme_sink: T,
        audio_sink: A,
        relay_base: impl Into<String>,
    ) -> Self {
        Self {
            metadata,
            palette,
            theme_sink: Mutex::new(theme_sink),
            audio_sink: Mutex::new(audio_sink),
            relay_base: relay_base.into(),
            seq: AtomicU64::new(0),
            session: Mutex::new(None),
        }
    }

    /// Runs the full pipeline for a newly selected video.
    ///
    /// A stage failure aborts the remaining stages; partial state already
    /// applied by earlier runs stays as-is.
    ///
    /// # Errors
    /// `MetadataFetch` or `PaletteExtraction` from the respective stage,
    /// `InvalidRelayBase` if the relay base cannot be turned into URLs.
    pub async fn select_video(&self, video_url: &str) -> Result<Selection, PipelineError> {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;

        let metadata = self.metadata.fetch(video_url).await?;
        if self.superseded(seq) {
            return Ok(Selection::Superseded);
        }

        let colors = self.palette.extract(&metadata.thumbnail_url).await?;
        if self.superseded(seq) {
            return Ok(Selection::Superseded);
        }

        let audio_url = relay_audio_url(&self.relay_base, video_url)?;

        // Commit point. The slot stays locked for the whole apply, so a
        // competing pipeline can never interleave partial writes.
        let mut session = self.session.lock().unwrap();
        if self.superseded(seq) {
            return Ok(Selection::Superseded);
        }

        {
            let mut theme_sink = self.theme_sink.lock().unwrap();
            apply_theme(&mut *theme_sink, &colors);
        }

        self.audio_sink
            .lock()
            .unwrap()
            .bind_source(audio_url.as_str());

        *session = Some(PlaybackSession {
            metadata,
            stops: gradient_stops(&colors),
            audio_source: Some(audio_url.into()),
        });

        Ok(Selection::Applied)
    }

    /// Snapshot of the current session, if any video has been selected.
    pub fn current_session(&self) -> Option<PlaybackSession> {
        self.session.lock().unwrap().clone()
    }

    fn superseded(&self, seq: u64) -> bool {
        self.seq.load(Ordering::SeqCst) != seq
    }
}

#[cfg(test)]
mod test {
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;
    use prism_theme::ThemeSink;
    use tokio::sync::Notify;
    use types::{BackgroundStyle, PaletteColor, VideoMetadata, VisualizerGradient};

    use super::{relay_audio_url, AudioSink, Orchestrator, Selection};
    use crate::metadata::MetadataSource;
    use crate::palette::PaletteSource;
    use crate::PipelineError;

    #[derive(Clone, Default)]
    struct RecordingThemeSink {
        gradients: Arc<Mutex<Vec<VisualizerGradient>>>,
        backgrounds: Arc<Mutex<Vec<BackgroundStyle>>>,
    }

    impl ThemeSink for RecordingThemeSink {
        fn register_gradient(&mut self, gradient: VisualizerGradient) {
            self.gradients.lock().unwrap().push(gradient);
        }

        fn set_active_gradient(&mut self, _name: &str) {}

        fn apply_background(&mut self, style: &BackgroundStyle) -> bool {
            self.backgrounds.lock().unwrap().push(style.clone());
            true
        }
    }

    #[derive(Clone, Default)]
    struct RecordingAudioSink {
        bound: Arc<Mutex<Vec<String>>>,
    }

    impl AudioSink for RecordingAudioSink {
        fn bind_source(&mut self, source: &str) {
            self.bound.lock().unwrap().push(source.to_string());
        }
    }

    struct FixedMetadata;

    impl MetadataSource for FixedMetadata {
        async fn fetch(&self, video_url: &str) -> Result<VideoMetadata, PipelineError> {
            Ok(VideoMetadata {
                title: format!("title of {video_url}"),
                author_name: "author".to_string(),
                thumbnail_url: format!("{video_url}/thumb.jpg"),
            })
        }
    }

    struct FailingMetadata;

    impl MetadataSource for FailingMetadata {
        async fn fetch(&self, _video_url: &str) -> Result<VideoMetadata, PipelineError> {
            Err(PipelineError::MetadataFetch("boom".to_string()))
        }
    }

    /// Palette fake: blocks on the gate for URLs containing "slow" and
    /// reports when such an extraction has started.
    struct GatedPalette {
        started: Arc<Notify>,
        gate: Arc<Notify>,
        colors: Vec<PaletteColor>,
    }

    impl PaletteSource for GatedPalette {
        async fn extract(&self, image_url: &str) -> Result<Vec<PaletteColor>, PipelineError> {
            if image_url.contains("slow") {
                self.started.notify_one();
                self.gate.notified().await;
            }

            Ok(self.colors.clone())
        }
    }

    fn palette(hexes: &[&str]) -> Vec<PaletteColor> {
        hexes.iter().map(|hex| PaletteColor::new(*hex)).collect()
    }

    #[test]
    fn test_relay_audio_url_encodes_the_video_url() {
        let audio_url =
            relay_audio_url("http://localhost:3000", "https://youtu.be/dQw4w9WgXcQ").unwrap();

        assert_eq!(
            audio_url.as_str(),
            "http://localhost:3000/api/ytAudio?url=https%3A%2F%2Fyoutu.be%2FdQw4w9WgXcQ"
        );
    }

    #[tokio::test]
    async fn test_select_video_applies_theme_audio_and_session() {
        let theme_sink = RecordingThemeSink::default();
        let audio_sink = RecordingAudioSink::default();

        let orchestrator = Orchestrator::new(
            FixedMetadata,
            GatedPalette {
                started: Arc::new(Notify::new()),
                gate: Arc::new(Notify::new()),
                colors: palette(&["#FF0000", "#0000FF"]),
            },
            theme_sink.clone(),
            audio_sink.clone(),
            "http://localhost:3000",
        );

        let outcome = orchestrator
            .select_video("https://youtu.be/video-a")
            .await
            .unwrap();
        assert_eq!(outcome, Selection::Applied);

        let session = orchestrator.current_session().unwrap();
        assert_eq!(session.metadata.title, "title of https://youtu.be/video-a");
        assert_eq!(session.stops.len(), 2);
        assert!(session
            .audio_source
            .unwrap()
            .contains("url=https%3A%2F%2Fyoutu.be%2Fvideo-a"));

        assert_eq!(theme_sink.gradients.lock().unwrap().len(), 1);
        assert_eq!(theme_sink.backgrounds.lock().unwrap().len(), 1);
        assert_eq!(audio_sink.bound.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_palette_still_binds_audio() {
        let theme_sink = RecordingThemeSink::default();
        let audio_sink = RecordingAudioSink::default();

        let orchestrator = Orchestrator::new(
            FixedMetadata,
            GatedPalette {
                started: Arc::new(Notify::new()),
                gate: Arc::new(Notify::new()),
                colors: Vec::new(),
            },
            theme_sink.clone(),
            audio_sink.clone(),
            "http://localhost:3000",
        );

        let outcome = orchestrator
            .select_video("https://youtu.be/plain")
            .await
            .unwrap();

        assert_eq!(outcome, Selection::Applied);
        // No gradient, no background, but the audio source is bound and the
        // session recorded with zero stops.
        assert_eq!(theme_sink.gradients.lock().unwrap().len(), 0);
        assert_eq!(theme_sink.backgrounds.lock().unwrap().len(), 0);
        assert_eq!(audio_sink.bound.lock().unwrap().len(), 1);
        assert_eq!(orchestrator.current_session().unwrap().stops.len(), 0);
    }

    #[tokio::test]
    async fn test_metadata_failure_aborts_without_side_effects() {
        let theme_sink = RecordingThemeSink::default();
        let audio_sink = RecordingAudioSink::default();

        let orchestrator = Orchestrator::new(
            FailingMetadata,
            GatedPalette {
                started: Arc::new(Notify::new()),
                gate: Arc::new(Notify::new()),
                colors: palette(&["#FF0000"]),
            },
            theme_sink.clone(),
            audio_sink.clone(),
            "http://localhost:3000",
        );

        let result = orchestrator.select_video("https://youtu.be/broken").await;

        assert!(matches!(result, Err(PipelineError::MetadataFetch(_))));
        assert_eq!(theme_sink.backgrounds.lock().unwrap().len(), 0);
        assert_eq!(audio_sink.bound.lock().unwrap().len(), 0);
        assert!(orchestrator.current_session().is_none());
    }

    #[tokio::test]
    async fn test_late_pipeline_cannot_overwrite_newer_selection() {
        let started = Arc::new(Notify::new());
        let gate = Arc::new(Notify::new());
        let theme_sink = RecordingThemeSink::default();
        let audio_sink = RecordingAudioSink::default();

        let orchestrator = Arc::new(Orchestrator::new(
            FixedMetadata,
            GatedPalette {
                started: started.clone(),
                gate: gate.clone(),
                colors: palette(&["#FF0000"]),
            },
            theme_sink.clone(),
            audio_sink.clone(),
            "http://localhost:3000",
        ));

        // A selects first and parks inside palette extraction.
        let slow = tokio::spawn({
            let orchestrator = orchestrator.clone();
            async move { orchestrator.select_video("https://youtu.be/slow-a").await }
        });
        started.notified().await;

        // B selects while A is still in flight and completes normally.
        let outcome = orchestrator
            .select_video("https://youtu.be/fast-b")
            .await
            .unwrap();
        assert_eq!(outcome, Selection::Applied);

        // A wakes up late; its results must be discarded wholesale.
        gate.notify_one();
        let late = slow.await.unwrap().unwrap();
        assert_eq!(late, Selection::Superseded);

        let session = orchestrator.current_session().unwrap();
        assert_eq!(session.metadata.title, "title of https://youtu.be/fast-b");

        let bound = audio_sink.bound.lock().unwrap();
        assert_eq!(bound.len(), 1);
        assert!(bound[0].contains("fast-b"));

        assert_eq!(theme_sink.backgrounds.lock().unwrap().len(), 1);
    }
}

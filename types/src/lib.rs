use serde::{Deserialize, Serialize};

/// Video metadata as returned by the oEmbed endpoint.
///
/// The fetch contract is "parseable JSON", not a validated schema, so every
/// field falls back to its default when the provider omits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub author_name: String,

    #[serde(default)]
    pub thumbnail_url: String,
}

/// A dominant color, `#RRGGBB` uppercase hex. Dominance rank is the position
/// in the containing sequence: index 0 is the most prevalent color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteColor {
    pub hex: String,
}

impl PaletteColor {
    pub fn new(hex: impl Into<String>) -> Self {
        Self { hex: hex.into() }
    }
}

/// One stop of the radial background gradient. Opacity decays linearly with
/// rank: `round((1 - rank/(N-1)) * 255)` for `N >= 2` stops, so the first
/// stop is fully opaque and the last fully transparent. A single-stop
/// gradient stays at full opacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradientStop {
    pub color: PaletteColor,
    pub opacity: u8,
}

/// Pure theme descriptor: the radial CSS background plus the flat color ramp
/// the visualizer consumes (no opacity decay in the ramp).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub radial_css: String,
    pub ramp: Vec<PaletteColor>,
}

/// Registration payload for a named visualizer color ramp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualizerGradient {
    pub name: String,

    pub bg_color: String,

    /// Gradient direction, `"h"` for horizontal.
    pub dir: String,

    pub color_stops: Vec<String>,
}

/// Inline style mutation set for the themable container element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundStyle {
    pub background: String,

    pub background_size: String,

    pub background_position: String,

    pub filter: String,
}

/// State owned by one playback element. Overwritten wholesale when a new
/// video is selected; the previous audio binding is discarded, not released,
/// since the consuming element only ever holds the most recent source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSession {
    pub metadata: VideoMetadata,

    pub stops: Vec<GradientStop>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_source: Option<String>,
}

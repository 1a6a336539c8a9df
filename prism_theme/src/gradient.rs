use types::{BackgroundStyle, GradientStop, PaletteColor, Theme, VisualizerGradient};

/// Name under which the thumbnail-derived ramp is registered on the
/// visualizer.
pub const GRADIENT_NAME: &str = "thumbnailGradient";

const VISUALIZER_BG_COLOR: &str = "#000";
const VISUALIZER_DIR: &str = "h";
const CONTAINER_FILTER: &str = "brightness(0.7)";

/// Adapter seam between the pure synthesis and the view. The synthesis
/// itself never touches the environment; an implementation of this trait
/// carries the side effects.
pub trait ThemeSink {
    fn register_gradient(&mut self, gradient: VisualizerGradient);

    fn set_active_gradient(&mut self, name: &str);

    /// Applies the background styling to the themable container.
    ///
    /// Returns `false` when the current view has no such container; the
    /// caller treats that as a skip, not an error.
    fn apply_background(&mut self, style: &BackgroundStyle) -> bool;
}

/// Computes the gradient stops for an ordered palette.
///
/// Opacity decays linearly with rank: `round((1 - rank/(N-1)) * 255)`.
/// A single color keeps full opacity; an empty palette yields no stops.
pub fn gradient_stops(colors: &[PaletteColor]) -> Vec<GradientStop> {
    let n = colors.len();

    colors
        .iter()
        .enumerate()
        .map(|(rank, color)| {
            let opacity = if n < 2 {
                u8::MAX
            } else {
                let fraction = 1.0 - rank as f64 / (n - 1) as f64;
                (fraction * 255.0).round() as u8
            };

            GradientStop {
                color: color.clone(),
                opacity,
            }
        })
        .collect()
}

/// Renders stops as a CSS radial gradient centered on the page, each stop an
/// 8-digit hex token (`#RRGGBB` + two-digit opacity byte).
pub fn radial_css(stops: &[GradientStop]) -> String {
    let tokens = stops
        .iter()
        .map(|stop| format!("{}{:02X}", stop.color.hex, stop.opacity))
        .collect::<Vec<_>>()
        .join(", ");

    format!("radial-gradient(circle at center, {tokens})")
}

/// Synthesizes the theme descriptor for an ordered palette.
///
/// Returns `None` for an empty palette: no gradient string is produced and
/// nothing should be applied.
pub fn synthesize(colors: &[PaletteColor]) -> Option<Theme> {
    if colors.is_empty() {
        return None;
    }

    let stops = gradient_stops(colors);

    Some(Theme {
        radial_css: radial_css(&stops),
        ramp: colors.to_vec(),
    })
}

/// Synthesizes the theme and applies it through the sink: registers the
/// flat ramp on the visualizer under [`GRADIENT_NAME`], activates it, and
/// sets the radial background on the container.
///
/// The ramp carries no opacity decay; only the radial background does.
pub fn apply_theme(sink: &mut dyn ThemeSink, colors: &[PaletteColor]) -> Option<Theme> {
    let theme = synthesize(colors)?;

    sink.register_gradient(VisualizerGradient {
        name: GRADIENT_NAME.to_string(),
        bg_color: VISUALIZER_BG_COLOR.to_string(),
        dir: VISUALIZER_DIR.to_string(),
        color_stops: theme.ramp.iter().map(|color| color.hex.clone()).collect(),
    });
    sink.set_active_gradient(GRADIENT_NAME);

    let style = BackgroundStyle {
        background: theme.radial_css.clone(),
        background_size: "cover".to_string(),
        background_position: "center".to_string(),
        filter: CONTAINER_FILTER.to_string(),
    };

    if !sink.apply_background(&style) {
        tracing::debug!("no themable container in view, background skipped");
    }

    Some(theme)
}

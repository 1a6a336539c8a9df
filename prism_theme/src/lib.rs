pub mod extract;
pub mod gradient;

pub use extract::{DominantColorExtractor, HslClusterExtractor, PaletteParams};
pub use gradient::{apply_theme, gradient_stops, radial_css, synthesize, ThemeSink, GRADIENT_NAME};

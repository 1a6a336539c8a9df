use std::collections::HashMap;

use image::RgbaImage;
use types::PaletteColor;

/// Tuning parameters for dominant color extraction.
///
/// The defaults are the fixed values the player uses for thumbnails: a
/// 64,000 pixel sample budget, a minimum perceptual distance of 0.22 between
/// retained colors (composed of saturation, lightness, and hue tolerances),
/// and at most 10 colors returned.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteParams {
    /// Maximum number of pixels sampled from the source image.
    pub pixels: u32,

    /// Minimum normalized RGB distance between retained colors.
    pub distance: f64,

    pub saturation_distance: f64,

    pub lightness_distance: f64,

    pub hue_distance: f64,

    /// Maximum number of colors returned.
    pub count: usize,
}

impl Default for PaletteParams {
    fn default() -> Self {
        Self {
            pixels: 64_000,
            distance: 0.22,
            saturation_distance: 0.2,
            lightness_distance: 0.2,
            hue_distance: 1.0 / 12.0,
            count: 10,
        }
    }
}

/// Opaque capability: given image pixels and tolerance parameters, produce
/// an ordered list of dominant colors (rank 0 = most prevalent).
pub trait DominantColorExtractor {
    fn extract(&self, image: &RgbaImage, params: &PaletteParams) -> Vec<PaletteColor>;
}

/// Default extractor: quantize-count-merge over HSL/RGB distances.
///
/// Pixels are sampled on a uniform grid up to the configured budget,
/// bucketed by 4-bit-per-channel quantization, and the bucket means are
/// retained greedily in population order, skipping any color perceptually
/// too close to one already kept.
#[derive(Debug, Default, Clone, Copy)]
pub struct HslClusterExtractor;

// Pixels more transparent than this carry no usable color.
const MIN_ALPHA: u8 = 128;

struct Bucket {
    count: u64,
    r: u64,
    g: u64,
    b: u64,
}

impl DominantColorExtractor for HslClusterExtractor {
    fn extract(&self, image: &RgbaImage, params: &PaletteParams) -> Vec<PaletteColor> {
        let total = u64::from(image.width()) * u64::from(image.height());
        let step = usize::try_from(total.div_ceil(u64::from(params.pixels.max(1))))
            .unwrap_or(usize::MAX)
            .max(1);

        let mut buckets: HashMap<u16, Bucket> = HashMap::new();

        for pixel in image.pixels().step_by(step) {
            let [r, g, b, a] = pixel.0;
            if a < MIN_ALPHA {
                continue;
            }

            let key = (u16::from(r >> 4) << 8) | (u16::from(g >> 4) << 4) | u16::from(b >> 4);
            let bucket = buckets.entry(key).or_insert(Bucket {
                count: 0,
                r: 0,
                g: 0,
                b: 0,
            });
            bucket.count += 1;
            bucket.r += u64::from(r);
            bucket.g += u64::from(g);
            bucket.b += u64::from(b);
        }

        let mut ordered: Vec<(u16, Bucket)> = buckets.into_iter().collect();
        // Population order; key breaks ties so the result is deterministic.
        ordered.sort_by(|a, b| b.1.count.cmp(&a.1.count).then(a.0.cmp(&b.0)));

        let mut kept: Vec<Candidate> = Vec::new();
        for (_, bucket) in ordered {
            if kept.len() >= params.count {
                break;
            }

            let candidate = Candidate::from_bucket(&bucket);
            if kept
                .iter()
                .all(|existing| candidate.is_distinct_from(existing, params))
            {
                kept.push(candidate);
            }
        }

        kept.iter().map(Candidate::to_palette_color).collect()
    }
}

struct Candidate {
    rgb: [u8; 3],
    hsl: (f64, f64, f64),
}

impl Candidate {
    fn from_bucket(bucket: &Bucket) -> Self {
        let mean = |sum: u64| -> u8 {
            u8::try_from((sum + bucket.count / 2) / bucket.count).unwrap_or(u8::MAX)
        };
        let rgb = [mean(bucket.r), mean(bucket.g), mean(bucket.b)];

        Self {
            rgb,
            hsl: rgb_to_hsl(rgb),
        }
    }

    fn is_distinct_from(&self, other: &Self, params: &PaletteParams) -> bool {
        if rgb_distance(self.rgb, other.rgb) >= params.distance {
            return true;
        }

        let (h_a, s_a, l_a) = self.hsl;
        let (h_b, s_b, l_b) = other.hsl;

        hue_gap(h_a, h_b) >= params.hue_distance
            || (s_a - s_b).abs() >= params.saturation_distance
            || (l_a - l_b).abs() >= params.lightness_distance
    }

    fn to_palette_color(&self) -> PaletteColor {
        PaletteColor::new(format!(
            "#{:02X}{:02X}{:02X}",
            self.rgb[0], self.rgb[1], self.rgb[2]
        ))
    }
}

// Euclidean distance over normalized channels, scaled into [0, 1].
fn rgb_distance(a: [u8; 3], b: [u8; 3]) -> f64 {
    let sum: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = (f64::from(x) - f64::from(y)) / 255.0;
            d * d
        })
        .sum();

    (sum / 3.0).sqrt()
}

// Hue in [0, 1), saturation and lightness in [0, 1].
fn rgb_to_hsl(rgb: [u8; 3]) -> (f64, f64, f64) {
    let r = f64::from(rgb[0]) / 255.0;
    let g = f64::from(rgb[1]) / 255.0;
    let b = f64::from(rgb[2]) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    let d = max - min;
    if d < f64::EPSILON {
        return (0.0, 0.0, l);
    }

    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let h = if (max - r).abs() < f64::EPSILON {
        ((g - b) / d).rem_euclid(6.0)
    } else if (max - g).abs() < f64::EPSILON {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    } / 6.0;

    (h, s, l)
}

// Hues wrap around, so the gap is the shorter way around the circle.
fn hue_gap(a: f64, b: f64) -> f64 {
    let d = (a - b).abs();
    d.min(1.0 - d)
}

// Color scale mapping - Turns normalized link statistics into renderable colors
use super::error::PipelineError;
use serde::{Deserialize, Serialize, Serializer};

pub const LEGEND_STEPS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, alpha: 255 }
    }

    /// Parse `#rrggbb` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_rgb_string(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }

    pub fn to_css(&self) -> String {
        if self.alpha == 255 {
            self.to_hex()
        } else {
            format!(
                "rgba({}, {}, {}, {:.2})",
                self.r,
                self.g,
                self.b,
                self.alpha as f64 / 255.0
            )
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_css())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    Opacity,
    #[default]
    Spectrum,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleType {
    #[default]
    Linear,
    Sqrt,
}

/// Sequential and diverging palettes, named after their d3 interpolators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorScheme {
    #[default]
    #[serde(rename = "interpolateOranges")]
    Oranges,
    #[serde(rename = "interpolateReds")]
    Reds,
    #[serde(rename = "interpolateGreens")]
    Greens,
    #[serde(rename = "interpolateBlues")]
    Blues,
    #[serde(rename = "interpolatePurples")]
    Purples,
    #[serde(rename = "interpolateGreys")]
    Greys,
    #[serde(rename = "interpolateRdYlGn")]
    RdYlGn,
    #[serde(rename = "interpolateRdYlBu")]
    RdYlBu,
    #[serde(rename = "interpolateSpectral")]
    Spectral,
    #[serde(rename = "interpolateViridis")]
    Viridis,
}

impl ColorScheme {
    pub const ALL: [ColorScheme; 10] = [
        ColorScheme::Oranges,
        ColorScheme::Reds,
        ColorScheme::Greens,
        ColorScheme::Blues,
        ColorScheme::Purples,
        ColorScheme::Greys,
        ColorScheme::RdYlGn,
        ColorScheme::RdYlBu,
        ColorScheme::Spectral,
        ColorScheme::Viridis,
    ];

    fn stops(&self) -> &'static [u32] {
        match self {
            ColorScheme::Oranges => &[
                0xfff5eb, 0xfee6ce, 0xfdd0a2, 0xfdae6b, 0xfd8d3c, 0xf16913, 0xd94801, 0xa63603,
                0x7f2704,
            ],
            ColorScheme::Reds => &[
                0xfff5f0, 0xfee0d2, 0xfcbba1, 0xfc9272, 0xfb6a4a, 0xef3b2c, 0xcb181d, 0xa50f15,
                0x67000d,
            ],
            ColorScheme::Greens => &[
                0xf7fcf5, 0xe5f5e0, 0xc7e9c0, 0xa1d99b, 0x74c476, 0x41ab5d, 0x238b45, 0x006d2c,
                0x00441b,
            ],
            ColorScheme::Blues => &[
                0xf7fbff, 0xdeebf7, 0xc6dbef, 0x9ecae1, 0x6baed6, 0x4292c6, 0x2171b5, 0x08519c,
                0x08306b,
            ],
            ColorScheme::Purples => &[
                0xfcfbfd, 0xefedf5, 0xdadaeb, 0xbcbddc, 0x9e9ac8, 0x807dba, 0x6a51a3, 0x54278f,
                0x3f007d,
            ],
            ColorScheme::Greys => &[
                0xffffff, 0xf0f0f0, 0xd9d9d9, 0xbdbdbd, 0x969696, 0x737373, 0x525252, 0x252525,
                0x000000,
            ],
            ColorScheme::RdYlGn => &[
                0xa50026, 0xd73027, 0xf46d43, 0xfdae61, 0xfee08b, 0xffffbf, 0xd9ef8b, 0xa6d96a,
                0x66bd63, 0x1a9850, 0x006837,
            ],
            ColorScheme::RdYlBu => &[
                0xa50026, 0xd73027, 0xf46d43, 0xfdae61, 0xfee090, 0xffffbf, 0xe0f3f8, 0xabd9e9,
                0x74add1, 0x4575b4, 0x313695,
            ],
            ColorScheme::Spectral => &[
                0x9e0142, 0xd53e4f, 0xf46d43, 0xfdae61, 0xfee08b, 0xffffbf, 0xe6f598, 0xabdda4,
                0x66c2a5, 0x3288bd, 0x5e4fa2,
            ],
            ColorScheme::Viridis => &[
                0x440154, 0x482878, 0x3e4989, 0x31688e, 0x26828e, 0x1f9e89, 0x35b779, 0x6ece58,
                0xb5de2b, 0xfde725,
            ],
        }
    }

    /// Piecewise-linear interpolation across the palette stops, `t` in [0, 1].
    pub fn interpolate(&self, t: f64) -> Color {
        let stops = self.stops();
        let scaled = t.clamp(0.0, 1.0) * (stops.len() - 1) as f64;
        let i = (scaled.floor() as usize).min(stops.len() - 2);
        let frac = scaled - i as f64;

        let (from, to) = (stops[i], stops[i + 1]);
        let lerp = |shift: u32| {
            let a = ((from >> shift) & 0xff) as f64;
            let b = ((to >> shift) & 0xff) as f64;
            (a + (b - a) * frac).round() as u8
        };
        Color::rgb(lerp(16), lerp(8), lerp(0))
    }
}

fn default_exponent() -> f64 {
    0.5
}

fn default_card_color() -> String {
    "#b4ff00".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorConfig {
    #[serde(default)]
    pub mode: ColorMode,
    #[serde(default)]
    pub color_scale: ScaleType,
    #[serde(default = "default_exponent")]
    pub exponent: f64,
    #[serde(default)]
    pub color_scheme: ColorScheme,
    /// Base color for opacity mode.
    #[serde(default = "default_card_color")]
    pub card_color: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            mode: ColorMode::default(),
            color_scale: ScaleType::default(),
            exponent: default_exponent(),
            color_scheme: ColorScheme::default(),
            card_color: default_card_color(),
        }
    }
}

/// A domain must be finite and non-empty to normalize against.
pub fn validate_domain(min: f64, max: f64) -> Result<(), PipelineError> {
    if !min.is_finite() || !max.is_finite() || max == min {
        return Err(PipelineError::InvalidDomain { min, max });
    }
    Ok(())
}

/// Map a raw value onto the layer domain as a percentage.
///
/// Values outside `[min, max]` yield percentages below 0 or above 100; the
/// scale clamps them when picking a color.
pub fn normalize(value: f64, min: f64, max: f64) -> Result<f64, PipelineError> {
    validate_domain(min, max)?;
    Ok(((value - min) / (max - min)) * 100.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub rgb_values: Vec<String>,
    pub hex_values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    mode: ColorMode,
    scale_type: ScaleType,
    exponent: f64,
    scheme: ColorScheme,
    card_color: Color,
}

impl ColorScale {
    pub fn new(config: &ColorConfig) -> Self {
        let card_color = Color::from_hex(&config.card_color).unwrap_or_else(|| {
            tracing::warn!(
                "Invalid card color {:?}, using {}",
                config.card_color,
                default_card_color()
            );
            Color::rgb(0xb4, 0xff, 0x00)
        });
        let exponent = if config.exponent.is_finite() && config.exponent > 0.0 {
            config.exponent
        } else {
            default_exponent()
        };

        Self {
            mode: config.mode,
            scale_type: config.color_scale,
            exponent,
            scheme: config.color_scheme,
            card_color,
        }
    }

    fn position(&self, percentage: f64) -> f64 {
        let t = if percentage.is_nan() {
            0.0
        } else {
            (percentage / 100.0).clamp(0.0, 1.0)
        };
        match self.scale_type {
            ScaleType::Linear => t,
            ScaleType::Sqrt => t.powf(self.exponent),
        }
    }

    pub fn color(&self, percentage: f64) -> Color {
        let t = self.position(percentage);
        match self.mode {
            ColorMode::Spectrum => self.scheme.interpolate(t),
            ColorMode::Opacity => Color {
                alpha: (t * 255.0).round() as u8,
                ..self.card_color
            },
        }
    }

    /// Evenly spaced swatches from 0% to 100% for the map legend.
    pub fn legend(&self, steps: usize) -> Legend {
        let steps = steps.max(2);
        let colors: Vec<Color> = (0..steps)
            .map(|i| self.color(i as f64 * 100.0 / (steps - 1) as f64))
            .collect();

        Legend {
            rgb_values: colors.iter().map(Color::to_rgb_string).collect(),
            hex_values: colors.iter().map(Color::to_hex).collect(),
        }
    }
}

//! Parameter types for sheet composition.
//!
//! These structs describe *what* to draw, not *how*. [`LayoutParams`] is the
//! interface between configuration (which decides the geometry) and the
//! [`compose`](super::compose) renderer (which does the pixel work).
//!
//! ## Types
//!
//! - [`Quality`] — JPEG encoding quality (1–100, default 90). Clamped on construction.
//! - [`Color`] — Opaque RGB background color, parsed from `#RRGGBB`.
//! - [`Filter`] — Resampling filter used when scaling slides onto the canvas.
//! - [`LayoutParams`] — Full specification for one sheet: width, margin, grid, background.

use super::backend::Dimensions;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// An opaque RGB color.
///
/// Serialized as a `#RRGGBB` hex string so config files stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Azure (`#F0FFFF`), the stock sheet background.
    pub const AZURE: Color = Color::rgb(0xF0, 0xFF, 0xFF);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, 255])
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::AZURE
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = String;

    /// Parse `#RRGGBB` or the shorthand `#RGB` (leading `#` optional).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || format!("invalid color {s:?}: expected #RRGGBB");
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
        match hex.len() {
            6 => Ok(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                let wide = |i: usize| channel(&hex[i..=i].repeat(2));
                Ok(Self::rgb(wide(0)?, wide(1)?, wide(2)?))
            }
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Resampling filter for scaling slides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Filter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl Filter {
    pub fn filter_type(self) -> FilterType {
        match self {
            Filter::Nearest => FilterType::Nearest,
            Filter::Triangle => FilterType::Triangle,
            Filter::CatmullRom => FilterType::CatmullRom,
            Filter::Gaussian => FilterType::Gaussian,
            Filter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Geometry and appearance of one composite sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutParams {
    /// Fixed canvas width in pixels.
    pub target_width: u32,
    /// Spacing between canvas edge, cover and grid cells.
    pub margin: u32,
    /// Grid cells per row.
    pub columns: u32,
    /// Upper bound on slides considered, cover included.
    pub max_items: usize,
    /// Expected native slide size; its aspect ratio sets the grid cell height.
    pub reference_item: Dimensions,
    pub background: Color,
    pub filter: Filter,
}

impl LayoutParams {
    pub const DEFAULT_WIDTH: u32 = 800;
    pub const DEFAULT_MARGIN: u32 = 5;
    pub const DEFAULT_COLUMNS: u32 = 3;
    pub const DEFAULT_REFERENCE: Dimensions = Dimensions {
        width: 1280,
        height: 720,
    };

    /// Default item cap for a column count: nine full rows plus the cover.
    pub fn default_max_items(columns: u32) -> usize {
        columns as usize * 9 + 1
    }
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            target_width: Self::DEFAULT_WIDTH,
            margin: Self::DEFAULT_MARGIN,
            columns: Self::DEFAULT_COLUMNS,
            max_items: Self::default_max_items(Self::DEFAULT_COLUMNS),
            reference_item: Self::DEFAULT_REFERENCE,
            background: Color::default(),
            filter: Filter::default(),
        }
    }
}

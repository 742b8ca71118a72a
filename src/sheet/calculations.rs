//! Pure layout calculations for a contact sheet.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! ```text
//! ┌──────────────────────────────┐  ─┬─ margin
//! │ ┌──────────────────────────┐ │   │
//! │ │          cover           │ │   │ cover_height (cover aspect)
//! │ └──────────────────────────┘ │  ─┼─ margin
//! │ ┌──────┐ ┌──────┐ ┌──────┐   │   │ item_height (reference aspect)
//! │ │  1   │ │  2   │ │  3   │   │  ─┼─ margin
//! │ └──────┘ └──────┘ └──────┘   │   │
//! │ ┌──────┐                     │   │ … one band per row
//! │ │  4   │                     │  ─┴─ margin
//! └──────────────────────────────┘
//! ```
//!
//! Scaled sizes use round-half-up on `f64` ratios. Heights are computed in
//! `u64` and a plan is refused once the canvas passes [`MAX_CANVAS_PIXELS`].

use super::backend::Dimensions;
use super::params::LayoutParams;
use serde::Serialize;
use thiserror::Error;

/// Axis-aligned placement rectangle on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }
}

/// Complete geometry of one sheet: canvas size and every placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutPlan {
    pub canvas: Dimensions,
    pub cover: Rect,
    /// Uniform grid cell size shared by every item.
    pub cell: Dimensions,
    pub rows: u32,
    /// Grid item placements, row-major.
    pub items: Vec<Rect>,
}

/// Check that `params` describe a drawable sheet.
///
/// Returns a human-readable reason on failure.
pub fn validate_params(params: &LayoutParams) -> Result<(), String> {
    if params.target_width == 0 {
        return Err("target width must be greater than 0".into());
    }
    if params.columns == 0 {
        return Err("columns must be at least 1".into());
    }
    if params.max_items == 0 {
        return Err("max items must be at least 1".into());
    }
    if params.reference_item.width == 0 || params.reference_item.height == 0 {
        return Err("reference item size must be non-zero".into());
    }
    if params.margin.saturating_mul(2) >= params.target_width {
        return Err(format!(
            "margin {} leaves no room for the cover in width {}",
            params.margin, params.target_width
        ));
    }
    let gutters = u64::from(params.margin) * (u64::from(params.columns) + 1);
    if gutters + u64::from(params.columns) > u64::from(params.target_width) {
        return Err(format!(
            "{} columns with margin {} do not fit in width {}",
            params.columns, params.margin, params.target_width
        ));
    }
    Ok(())
}

/// Largest canvas a plan may describe, in pixels (512 MiB as RGBA).
pub const MAX_CANVAS_PIXELS: u64 = 1 << 27;

/// Geometry that does not fit a drawable canvas.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// The cover alone exceeds the canvas limit.
    #[error("cover scales to {width}x{height}, over the canvas limit")]
    CoverTooLarge { width: u32, height: u64 },
    /// The reference size makes a single grid cell exceed the canvas limit.
    #[error("grid cell scales to {width}x{height}, over the canvas limit")]
    CellTooLarge { width: u32, height: u64 },
    /// Cover plus grid rows exceed the canvas limit.
    #[error("canvas would be {width}x{height}, over the canvas limit")]
    CanvasTooLarge { width: u32, height: u64 },
}

/// Scale `value` by `numerator / denominator`, rounding half up.
///
/// Never returns 0: a drawn element is at least one pixel. Saturates instead
/// of wrapping on absurd ratios.
fn scale(value: u32, numerator: u32, denominator: u32) -> u64 {
    let scaled = (f64::from(value) * f64::from(numerator) / f64::from(denominator)).round();
    (scaled as u64).max(1)
}

/// `height` as `u32` if a `width x height` canvas stays within [`MAX_CANVAS_PIXELS`].
fn fitting_height(width: u32, height: u64) -> Option<u32> {
    let pixels = u64::from(width).saturating_mul(height);
    if pixels > MAX_CANVAS_PIXELS {
        return None;
    }
    u32::try_from(height).ok()
}

/// Number of grid rows needed for `item_count` items.
pub fn row_count(item_count: usize, columns: u32) -> u32 {
    u32::try_from(item_count.div_ceil(columns as usize)).unwrap_or(u32::MAX)
}

/// Cover size: full width inside the margins, height from the cover's own aspect.
pub fn cover_dimensions(
    cover: Dimensions,
    params: &LayoutParams,
) -> Result<Dimensions, LayoutError> {
    let width = params.target_width - 2 * params.margin;
    let height = scale(cover.height, width, cover.width);
    let with_margins = height.saturating_add(2 * u64::from(params.margin));
    if fitting_height(params.target_width, with_margins).is_none() {
        return Err(LayoutError::CoverTooLarge { width, height });
    }
    Ok(Dimensions {
        width,
        height: height as u32,
    })
}

/// Grid cell size: equal share of the width, height from the reference aspect.
pub fn cell_dimensions(params: &LayoutParams) -> Result<Dimensions, LayoutError> {
    let available = params.target_width - params.margin * (params.columns + 1);
    let width = ((f64::from(available) / f64::from(params.columns)).round() as u32).max(1);
    let height = scale(
        params.reference_item.height,
        width,
        params.reference_item.width,
    );
    match fitting_height(params.target_width, height) {
        Some(height) => Ok(Dimensions { width, height }),
        None => Err(LayoutError::CellTooLarge { width, height }),
    }
}

/// Canvas height: top margin, cover, separating margin, then one
/// `cell + margin` band per row.
pub fn canvas_height(cover_height: u32, cell_height: u32, rows: u32, margin: u32) -> u64 {
    let margin = u64::from(margin);
    let band = u64::from(cell_height) + margin;
    (2 * margin + u64::from(cover_height)).saturating_add(u64::from(rows).saturating_mul(band))
}

/// Compute the full layout for a cover of size `cover` and `item_count` grid items.
///
/// `params` must already have passed [`validate_params`] and `cover` must be
/// non-zero in both dimensions. Fails when the resulting canvas would exceed
/// [`MAX_CANVAS_PIXELS`].
pub fn plan_layout(
    cover: Dimensions,
    item_count: usize,
    params: &LayoutParams,
) -> Result<LayoutPlan, LayoutError> {
    let margin = params.margin;
    let cover_size = cover_dimensions(cover, params)?;
    let cell = cell_dimensions(params)?;
    let rows = row_count(item_count, params.columns);

    let height = canvas_height(cover_size.height, cell.height, rows, margin);
    let height = fitting_height(params.target_width, height).ok_or(LayoutError::CanvasTooLarge {
        width: params.target_width,
        height,
    })?;

    let cover_rect = Rect {
        x: margin,
        y: margin,
        width: cover_size.width,
        height: cover_size.height,
    };

    // The cursor never leaves the bounded canvas.
    let mut items = Vec::with_capacity(item_count);
    let (mut x, mut y) = (margin, cover_rect.bottom() + margin);
    let mut in_row = 0;
    for _ in 0..item_count {
        items.push(Rect {
            x,
            y,
            width: cell.width,
            height: cell.height,
        });
        x += cell.width + margin;
        in_row += 1;
        if in_row == params.columns {
            in_row = 0;
            x = margin;
            y += cell.height + margin;
        }
    }

    Ok(LayoutPlan {
        canvas: Dimensions {
            width: params.target_width,
            height,
        },
        cover: cover_rect,
        cell,
        rows,
        items,
    })
}

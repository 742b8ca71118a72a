//! Sheet rendering.
//!
//! Combines [`plan_layout`] with pixel work: fill the canvas, then stretch the
//! cover and every grid item into their rectangles. Two entry points share one
//! renderer:
//!
//! - [`compose`] loads slides lazily by path through an [`ImageBackend`], so at
//!   most the cover and one grid item are decoded at a time.
//! - [`compose_images`] draws images the caller already holds in memory.
//!
//! Composition is all-or-nothing: any failure drops the canvas and returns the
//! error, never a partially drawn sheet.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::{LayoutError, LayoutPlan, Rect, plan_layout, validate_params};
use super::params::LayoutParams;
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage, RgbaImage};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("No slide images to compose")]
    EmptySource,
    #[error("Invalid layout parameters: {0}")]
    InvalidParameter(String),
    #[error("Slide {index} ({}) could not be used: {source}", display_path(.path))]
    SourceImage {
        index: usize,
        path: Option<PathBuf>,
        #[source]
        source: BackendError,
    },
}

fn display_path(path: &Option<PathBuf>) -> String {
    path.as_deref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "in memory".to_string())
}

/// Compose a sheet from slide files, decoding each one on demand.
///
/// `paths[0]` is the cover. At most `params.max_items` paths are read.
pub fn compose(
    backend: &impl ImageBackend,
    paths: &[PathBuf],
    params: &LayoutParams,
) -> Result<RgbImage, ComposeError> {
    render(paths, paths.len(), params, |index| {
        let path = &paths[index];
        backend
            .load(path)
            .map(Cow::Owned)
            .map_err(|source| source_error(index, Some(path), source))
    })
}

/// Compose a sheet from already-decoded images. `images[0]` is the cover.
pub fn compose_images(
    images: &[DynamicImage],
    params: &LayoutParams,
) -> Result<RgbImage, ComposeError> {
    render(&[], images.len(), params, |index| {
        Ok(Cow::Borrowed(&images[index]))
    })
}

/// Compute the layout for a slide sequence without rendering it.
///
/// Only the cover's dimensions are read, via [`ImageBackend::identify`].
pub fn plan(
    backend: &impl ImageBackend,
    paths: &[PathBuf],
    params: &LayoutParams,
) -> Result<LayoutPlan, ComposeError> {
    validate_params(params).map_err(ComposeError::InvalidParameter)?;
    let count = paths.len().min(params.max_items);
    let cover_path = paths.first().ok_or(ComposeError::EmptySource)?;
    let cover = backend
        .identify(cover_path)
        .map_err(|source| source_error(0, Some(cover_path), source))?;
    check_dimensions(cover, 0, Some(cover_path))?;
    plan_layout(cover, count - 1, params).map_err(|e| layout_error(e, Some(cover_path)))
}

fn source_error(index: usize, path: Option<&Path>, source: BackendError) -> ComposeError {
    ComposeError::SourceImage {
        index,
        path: path.map(Path::to_path_buf),
        source,
    }
}

/// An oversized cover is the cover's fault; any other overflow is the layout's.
fn layout_error(error: LayoutError, cover_path: Option<&Path>) -> ComposeError {
    match error {
        LayoutError::CoverTooLarge { .. } => {
            let source = BackendError::Decode {
                path: cover_path.map(Path::to_path_buf).unwrap_or_default(),
                reason: error.to_string(),
            };
            source_error(0, cover_path, source)
        }
        LayoutError::CellTooLarge { .. } | LayoutError::CanvasTooLarge { .. } => {
            ComposeError::InvalidParameter(error.to_string())
        }
    }
}

fn check_dimensions(
    dims: Dimensions,
    index: usize,
    path: Option<&Path>,
) -> Result<(), ComposeError> {
    if dims.width == 0 || dims.height == 0 {
        let reason = format!("zero-sized image ({}x{})", dims.width, dims.height);
        let source = BackendError::Decode {
            path: path.map(Path::to_path_buf).unwrap_or_default(),
            reason,
        };
        return Err(source_error(index, path, source));
    }
    Ok(())
}

/// Stretch `image` to `rect` and composite it over the canvas.
fn draw(canvas: &mut RgbaImage, image: &DynamicImage, rect: Rect, filter: FilterType) {
    let scaled = image
        .resize_exact(rect.width, rect.height, filter)
        .into_rgba8();
    imageops::overlay(canvas, &scaled, i64::from(rect.x), i64::from(rect.y));
}

/// Shared renderer. `paths` labels errors and may be empty for in-memory input.
fn render<'a, F>(
    paths: &[PathBuf],
    count: usize,
    params: &LayoutParams,
    mut load: F,
) -> Result<RgbImage, ComposeError>
where
    F: FnMut(usize) -> Result<Cow<'a, DynamicImage>, ComposeError>,
{
    validate_params(params).map_err(ComposeError::InvalidParameter)?;
    let count = count.min(params.max_items);
    if count == 0 {
        return Err(ComposeError::EmptySource);
    }

    let path_of = |index: usize| paths.get(index).map(PathBuf::as_path);

    let cover = load(0)?;
    let cover_dims = Dimensions::of(&cover);
    check_dimensions(cover_dims, 0, path_of(0))?;
    let layout =
        plan_layout(cover_dims, count - 1, params).map_err(|e| layout_error(e, path_of(0)))?;

    let filter = params.filter.filter_type();
    let mut canvas = RgbaImage::from_pixel(
        layout.canvas.width,
        layout.canvas.height,
        params.background.to_rgba(),
    );

    draw(&mut canvas, &cover, layout.cover, filter);
    drop(cover);

    for (offset, rect) in layout.items.iter().enumerate() {
        let index = offset + 1;
        let item = load(index)?;
        check_dimensions(Dimensions::of(&item), index, path_of(index))?;
        draw(&mut canvas, &item, *rect, filter);
    }

    Ok(DynamicImage::ImageRgba8(canvas).into_rgb8())
}

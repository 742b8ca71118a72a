//! Image backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations the sheet pipeline
//! needs from an image library: identify, load, and save.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests swap in a recording mock so composition logic can be checked
//! without touching the filesystem.

use super::params::Quality;
use image::{DynamicImage, RgbImage};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("Failed to encode {path}: {reason}")]
    Encode { path: PathBuf, reason: String },
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
}

/// Pixel size of an image or a layout cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn of(image: &DynamicImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
        }
    }
}

/// Trait for image backends.
///
/// `Sync` so one backend can be shared across rayon workers in batch mode.
pub trait ImageBackend: Sync {
    /// Get image dimensions without a full decode where the format allows it.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode an image from disk.
    fn load(&self, path: &Path) -> Result<DynamicImage, BackendError>;

    /// Encode a composite sheet, choosing the format from the path's extension.
    fn save(&self, image: &RgbImage, path: &Path, quality: Quality) -> Result<(), BackendError>;
}

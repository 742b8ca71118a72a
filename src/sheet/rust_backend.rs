//! Pure Rust image backend on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::image_dimensions` (header only) |
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` with format guessing |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` with quality |
//! | Encode → PNG, TIFF, WebP | `RgbImage::write_to` (lossless) |
//!
//! Saves are staged in a hidden `.part` file next to the target and renamed
//! into place with `tempfile` once encoding succeeds.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::Quality;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader, RgbImage};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Extensions whose decoders are compiled in.
const SLIDE_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

/// Returns the slide image extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> Vec<&'static str> {
    SLIDE_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn output_format(path: &Path) -> Result<ImageFormat, BackendError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    SLIDE_CANDIDATES
        .iter()
        .find(|(candidate, _)| *candidate == ext)
        .map(|(_, fmt)| *fmt)
        .ok_or(BackendError::UnsupportedFormat(ext))
}

fn encode_error(path: &Path, e: impl std::fmt::Display) -> BackendError {
    BackendError::Encode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) =
            image::image_dimensions(path).map_err(|e| BackendError::Decode {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(Dimensions { width, height })
    }

    fn load(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| BackendError::Decode {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    /// Encodes into a sibling temp file and renames it over `path` only once
    /// the encode has finished, so a failure never leaves a truncated sheet.
    fn save(&self, image: &RgbImage, path: &Path, quality: Quality) -> Result<(), BackendError> {
        let format = output_format(path)?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut builder = tempfile::Builder::new();
        builder.prefix(".slidesheet-").suffix(".part");
        // Same mode as a plainly created file (0666 minus umask), not tempfile's 0600.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o666));
        }
        let mut staged = builder.tempfile_in(dir)?;

        {
            let mut writer = BufWriter::new(staged.as_file_mut());
            match format {
                ImageFormat::Jpeg => {
                    let encoder = JpegEncoder::new_with_quality(&mut writer, quality.value() as u8);
                    image.write_with_encoder(encoder)
                }
                format => image.write_to(&mut writer, format),
            }
            .map_err(|e| encode_error(path, e))?;
            writer.flush()?;
        }

        staged.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

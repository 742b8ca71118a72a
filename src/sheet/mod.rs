//! Contact-sheet layout and composition, pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Decode / encode** | `image` crate (JPEG, PNG, TIFF, WebP) |
//! | **Scale** | `DynamicImage::resize_exact` (stretch, never crop) |
//! | **Composite** | `imageops::overlay` onto a background-filled canvas |
//!
//! The module is split into:
//! - **Calculations**: Pure layout math and parameter validation (unit testable)
//! - **Parameters**: [`LayoutParams`], [`Color`], [`Filter`], [`Quality`]
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Compose**: Rendering that combines a layout plan with the backend

pub mod backend;
pub mod calculations;
pub mod compose;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{
    LayoutError, LayoutPlan, MAX_CANVAS_PIXELS, Rect, plan_layout, validate_params,
};
pub use compose::{ComposeError, compose, compose_images, plan};
pub use params::{Color, Filter, LayoutParams, Quality};
pub use rust_backend::{RustBackend, supported_input_extensions};

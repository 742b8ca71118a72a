//! # slidesheet
//!
//! Turns a presentation into a single contact-sheet thumbnail: the first slide
//! full width on top, every following slide in a fixed-column grid below it,
//! on one background canvas whose height fits the content.
//!
//! # Pipeline
//!
//! ```text
//! 1. Render    deck.pptx  →  Slide1.jpg … SlideN.jpg   (external exporter)
//! 2. Resolve   directory  →  ordered paths             (numeric, ≤ max_items)
//! 3. Compose   paths      →  RGB sheet                 (cover + grid)
//! 4. Save      sheet      →  deck.jpg
//! ```
//!
//! Only steps 2 and 3 carry design weight. Rendering is delegated to a
//! user-configured command, and saving is plain encoding.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`naming`] | First-number-in-filename sequence keys |
//! | [`resolve`] | Ordered slide discovery in an export directory |
//! | [`sheet`] | Layout math, parameters, image backend, composition |
//! | [`render`] | External slide exporter behind the [`render::SlideRenderer`] trait |
//! | [`batch`] | Document discovery, per-document pipeline, parallel batches |
//! | [`config`] | `slidesheet.toml` loading, merging over defaults, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Uniform Grid Cells
//!
//! Grid cells take their aspect ratio from the configured reference slide
//! size (1280×720 by default), not from each exported image. Exporters
//! occasionally emit slides a pixel or two off; a shared cell size keeps the
//! grid aligned. The cover is the exception and always keeps its own aspect.
//!
//! ## Stretch, Never Crop
//!
//! Every slide is scaled to exactly its rectangle. A slide whose native
//! ratio differs from the reference is distorted rather than letterboxed;
//! every pixel of content stays visible.
//!
//! ## All-or-Nothing Sheets
//!
//! A sheet is written only after every slide has been drawn. Any decode
//! failure aborts that document with no output. In batch mode the failure is
//! reported and the next document proceeds.

pub mod batch;
pub mod config;
pub mod naming;
pub mod output;
pub mod render;
pub mod resolve;
pub mod sheet;

//! Document discovery and the per-document sheet pipeline.
//!
//! ## Pipeline
//!
//! ```text
//! deck.pptx ──render──▶ $TMP/slidesheet-XXXX/Slide{1..N}.jpg
//!           ──resolve─▶ ordered paths (≤ max_items)
//!           ──compose─▶ RGB sheet
//!           ──save────▶ deck.jpg (next to the document)
//! ```
//!
//! The temp directory is a [`tempfile::TempDir`], removed when the document
//! finishes, whether it succeeded or not.
//!
//! ## Failure Isolation
//!
//! A batch never aborts on one bad document. Each document's error is
//! reported as a [`BatchEvent::Failed`] and counted in the [`BatchSummary`];
//! the remaining documents still run.
//!
//! ## Parallel Processing
//!
//! Documents are independent, so they run in parallel on the global
//! [rayon](https://docs.rs/rayon) pool. Each composition itself is sequential.

use crate::config::SheetConfig;
use crate::render::{RenderError, SlideRenderer};
use crate::resolve::{ResolveError, resolve};
use crate::sheet::{BackendError, ComposeError, Dimensions, ImageBackend, compose};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),
    #[error("{0}")]
    Resolve(#[from] ResolveError),
    #[error("{0}")]
    Compose(#[from] ComposeError),
    #[error("Saving sheet failed: {0}")]
    Save(#[from] BackendError),
}

/// Progress events emitted while a batch runs.
///
/// Sent over an optional channel so the CLI can print as documents finish.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    /// A path was not turned into a job.
    Skipped { path: String, reason: String },
    /// A sheet was written.
    Composed {
        /// 1-based position in the document list.
        index: usize,
        document: String,
        output: String,
        slides: usize,
        canvas: Dimensions,
    },
    /// A document failed; the batch continues.
    Failed {
        index: usize,
        document: String,
        error: String,
    },
}

/// What composing one slide directory produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetInfo {
    pub slides: usize,
    pub canvas: Dimensions,
}

/// Documents found by [`discover`], plus everything that was passed over.
#[derive(Debug, Default)]
pub struct Discovery {
    pub documents: Vec<PathBuf>,
    pub skipped: Vec<(PathBuf, String)>,
}

impl Discovery {
    /// Emit a [`BatchEvent::Skipped`] for every passed-over path.
    pub fn report_skipped(&self, progress: Option<&Sender<BatchEvent>>) {
        if let Some(tx) = progress {
            for (path, reason) in &self.skipped {
                let _ = tx.send(BatchEvent::Skipped {
                    path: path.display().to_string(),
                    reason: reason.clone(),
                });
            }
        }
    }
}

/// Totals for one batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub composed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} composed, {} failed, {} skipped",
            self.composed, self.failed, self.skipped
        )
    }
}

/// Where the sheet for `document` is written: same directory and stem.
pub fn output_path(document: &Path, extension: &str) -> PathBuf {
    document.with_extension(extension.trim_start_matches('.'))
}

/// Office writes `~$deck.pptx` owner files next to open documents.
fn is_lock_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("~$"))
}

fn is_document(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|ext| ext.eq_ignore_ascii_case(e)))
}

fn classify(path: PathBuf, extensions: &[String], discovery: &mut Discovery) {
    if is_lock_file(&path) {
        discovery.skipped.push((path, "Office lock file".to_string()));
    } else if is_document(&path, extensions) {
        discovery.documents.push(path);
    } else {
        discovery
            .skipped
            .push((path, "not a presentation".to_string()));
    }
}

/// Subdirectories before files, each group in filename order.
fn directories_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    let a_dir = a.file_type().is_dir();
    let b_dir = b.file_type().is_dir();
    b_dir
        .cmp(&a_dir)
        .then_with(|| a.file_name().cmp(b.file_name()))
}

/// Expand CLI paths into the list of presentation documents to process.
///
/// Files are classified by extension (case-insensitive). Directories are
/// walked recursively, visiting each directory's subdirectories before its
/// files. Missing paths are skipped, not fatal.
pub fn discover(paths: &[PathBuf], extensions: &[String]) -> Discovery {
    let mut discovery = Discovery::default();

    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by(directories_first) {
                match entry {
                    Ok(entry) if entry.file_type().is_file() => {
                        classify(entry.into_path(), extensions, &mut discovery);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        let at = e.path().unwrap_or(path).to_path_buf();
                        discovery.skipped.push((at, e.to_string()));
                    }
                }
            }
        } else if path.is_file() {
            classify(path.clone(), extensions, &mut discovery);
        } else {
            discovery.skipped.push((path.clone(), "not found".to_string()));
        }
    }

    discovery
}

/// Compose an already-exported slide directory into `output`.
pub fn compose_dir(
    backend: &impl ImageBackend,
    slides_dir: &Path,
    output: &Path,
    config: &SheetConfig,
) -> Result<SheetInfo, DocumentError> {
    let params = config.layout_params();
    let paths = resolve(slides_dir, &config.input.slide_extension, params.max_items)?;
    let sheet = compose(backend, &paths, &params)?;
    backend.save(&sheet, output, config.quality())?;
    Ok(SheetInfo {
        slides: paths.len(),
        canvas: Dimensions {
            width: sheet.width(),
            height: sheet.height(),
        },
    })
}

/// Render one document into a scoped temp directory and compose its sheet.
///
/// Returns the output path alongside the sheet info.
pub fn build_document(
    renderer: &impl SlideRenderer,
    backend: &impl ImageBackend,
    document: &Path,
    config: &SheetConfig,
) -> Result<(PathBuf, SheetInfo), DocumentError> {
    let slides_dir = tempfile::Builder::new().prefix("slidesheet-").tempdir()?;
    renderer.render(document, slides_dir.path())?;

    let output = output_path(document, &config.output.extension);
    let info = compose_dir(backend, slides_dir.path(), &output, config)?;
    Ok((output, info))
}

/// Build sheets for every document in parallel.
///
/// Never fails as a whole: per-document errors become [`BatchEvent::Failed`]
/// events and are counted in the summary.
pub fn build(
    renderer: &impl SlideRenderer,
    backend: &impl ImageBackend,
    documents: &[PathBuf],
    config: &SheetConfig,
    progress: Option<Sender<BatchEvent>>,
) -> BatchSummary {
    let composed = documents
        .par_iter()
        .enumerate()
        .map_with(progress, |tx, (i, document)| {
            let result = build_document(renderer, backend, document, config);
            let ok = result.is_ok();
            let event = match result {
                Ok((output, info)) => BatchEvent::Composed {
                    index: i + 1,
                    document: document.display().to_string(),
                    output: output.display().to_string(),
                    slides: info.slides,
                    canvas: info.canvas,
                },
                Err(e) => BatchEvent::Failed {
                    index: i + 1,
                    document: document.display().to_string(),
                    error: e.to_string(),
                },
            };
            if let Some(tx) = tx {
                let _ = tx.send(event);
            }
            ok
        })
        .filter(|ok| *ok)
        .count();

    BatchSummary {
        composed,
        failed: documents.len() - composed,
        skipped: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::tests::FakeRenderer;
    use crate::sheet::RustBackend;
    use std::fs;
    use tempfile::TempDir;

    fn png_config() -> SheetConfig {
        let mut config = SheetConfig::default();
        config.input.slide_extension = "png".to_string();
        config
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    fn write_slide(dir: &Path, name: &str, width: u32, height: u32) {
        image::RgbImage::from_pixel(width, height, image::Rgb([200, 10, 10]))
            .save(dir.join(name))
            .unwrap();
    }

    fn extensions() -> Vec<String> {
        vec!["ppt".to_string(), "pptx".to_string()]
    }

    // =========================================================================
    // discover
    // =========================================================================

    #[test]
    fn discover_walks_directories_recursively() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("b.pptx"));
        touch(&tmp.path().join("a.PPT"));
        touch(&tmp.path().join("talks/2024/keynote.pptx"));
        touch(&tmp.path().join("notes.txt"));

        let found = discover(&[tmp.path().to_path_buf()], &extensions());
        let names: Vec<_> = found
            .documents
            .iter()
            .map(|p| p.strip_prefix(tmp.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("talks/2024/keynote.pptx"),
                PathBuf::from("a.PPT"),
                PathBuf::from("b.pptx"),
            ]
        );
        assert_eq!(found.skipped.len(), 1);
        assert_eq!(found.skipped[0].1, "not a presentation");
    }

    #[test]
    fn discover_visits_subdirectories_before_files() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("a.pptx"));
        touch(&tmp.path().join("z/inner.pptx"));
        touch(&tmp.path().join("m/b.pptx"));
        touch(&tmp.path().join("m/a/deep.pptx"));

        let found = discover(&[tmp.path().to_path_buf()], &extensions());
        let names: Vec<_> = found
            .documents
            .iter()
            .map(|p| p.strip_prefix(tmp.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("m/a/deep.pptx"),
                PathBuf::from("m/b.pptx"),
                PathBuf::from("z/inner.pptx"),
                PathBuf::from("a.pptx"),
            ]
        );
    }

    #[test]
    fn discover_skips_lock_files() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("deck.pptx"));
        touch(&tmp.path().join("~$deck.pptx"));

        let found = discover(&[tmp.path().to_path_buf()], &extensions());
        assert_eq!(found.documents.len(), 1);
        assert_eq!(found.skipped[0].1, "Office lock file");
    }

    #[test]
    fn discover_accepts_explicit_files_and_reports_missing() {
        let tmp = TempDir::new().unwrap();
        let deck = tmp.path().join("deck.pptx");
        touch(&deck);
        let missing = tmp.path().join("gone.pptx");

        let found = discover(&[deck.clone(), missing.clone()], &extensions());
        assert_eq!(found.documents, vec![deck]);
        assert_eq!(found.skipped, vec![(missing, "not found".to_string())]);
    }

    #[test]
    fn report_skipped_sends_events() {
        let discovery = Discovery {
            documents: Vec::new(),
            skipped: vec![(PathBuf::from("notes.txt"), "not a presentation".to_string())],
        };
        let (tx, rx) = std::sync::mpsc::channel();
        discovery.report_skipped(Some(&tx));
        drop(tx);

        let events: Vec<_> = rx.iter().collect();
        assert!(matches!(
            &events[..],
            [BatchEvent::Skipped { path, .. }] if path == "notes.txt"
        ));
    }

    #[test]
    fn output_path_replaces_extension() {
        assert_eq!(
            output_path(Path::new("/talks/deck.pptx"), "jpg"),
            PathBuf::from("/talks/deck.jpg")
        );
        assert_eq!(
            output_path(Path::new("/talks/deck.v2.ppt"), ".png"),
            PathBuf::from("/talks/deck.v2.png")
        );
    }

    // =========================================================================
    // compose_dir
    // =========================================================================

    #[test]
    fn compose_dir_writes_sheet() {
        let tmp = TempDir::new().unwrap();
        let slides = tmp.path().join("export");
        fs::create_dir(&slides).unwrap();
        for i in 1..=8 {
            write_slide(&slides, &format!("Slide{i}.png"), 1280, 720);
        }
        let output = tmp.path().join("deck.jpg");

        let backend = RustBackend::new();
        let info = compose_dir(&backend, &slides, &output, &png_config()).unwrap();

        assert_eq!(info.slides, 8);
        assert_eq!(info.canvas, Dimensions { width: 800, height: 907 });
        assert_eq!(
            backend.identify(&output).unwrap(),
            Dimensions { width: 800, height: 907 }
        );
    }

    #[test]
    fn compose_dir_empty_directory_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let output = tmp.path().join("deck.jpg");

        let result = compose_dir(&RustBackend::new(), tmp.path(), &output, &png_config());
        assert!(matches!(
            result,
            Err(DocumentError::Resolve(ResolveError::Empty(_)))
        ));
        assert!(!output.exists());
    }

    #[test]
    fn compose_dir_corrupt_slide_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let slides = tmp.path().join("export");
        fs::create_dir(&slides).unwrap();
        write_slide(&slides, "Slide1.png", 1280, 720);
        fs::write(slides.join("Slide2.png"), b"truncated").unwrap();
        let output = tmp.path().join("deck.jpg");

        let result = compose_dir(&RustBackend::new(), &slides, &output, &png_config());
        assert!(matches!(
            result,
            Err(DocumentError::Compose(ComposeError::SourceImage { index: 1, .. }))
        ));
        assert!(!output.exists());
    }

    // =========================================================================
    // build_document / build
    // =========================================================================

    #[test]
    fn build_document_writes_next_to_document() {
        let tmp = TempDir::new().unwrap();
        let deck = tmp.path().join("deck.pptx");
        touch(&deck);

        let renderer = FakeRenderer::new(4);
        let (output, info) =
            build_document(&renderer, &RustBackend::new(), &deck, &png_config()).unwrap();

        assert_eq!(output, tmp.path().join("deck.jpg"));
        assert!(output.exists());
        assert_eq!(info.slides, 4);
    }

    #[test]
    fn build_continues_past_failures() {
        let tmp = TempDir::new().unwrap();
        let documents: Vec<PathBuf> = ["a.pptx", "broken.pptx", "c.pptx"]
            .iter()
            .map(|name| {
                let path = tmp.path().join(name);
                touch(&path);
                path
            })
            .collect();

        let renderer = FakeRenderer::new(3);
        let (tx, rx) = std::sync::mpsc::channel();
        let summary = build(
            &renderer,
            &RustBackend::new(),
            &documents,
            &png_config(),
            Some(tx),
        );

        assert_eq!(summary.composed, 2);
        assert_eq!(summary.failed, 1);
        assert!(tmp.path().join("a.jpg").exists());
        assert!(!tmp.path().join("broken.jpg").exists());
        assert!(tmp.path().join("c.jpg").exists());

        let events: Vec<BatchEvent> = rx.iter().collect();
        assert_eq!(events.len(), 3);
        let failed: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                BatchEvent::Failed {
                    index, document, ..
                } => Some((*index, document.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0, 2);
        assert!(failed[0].1.ends_with("broken.pptx"));
    }

    #[test]
    fn build_without_progress_channel() {
        let tmp = TempDir::new().unwrap();
        let deck = tmp.path().join("deck.pptx");
        touch(&deck);

        let summary = build(
            &FakeRenderer::new(1),
            &RustBackend::new(),
            &[deck],
            &png_config(),
            None,
        );
        assert_eq!(
            summary,
            BatchSummary {
                composed: 1,
                failed: 0,
                skipped: 0
            }
        );
    }

    #[test]
    fn renderer_producing_no_slides_fails_the_document() {
        let tmp = TempDir::new().unwrap();
        let deck = tmp.path().join("empty.pptx");
        touch(&deck);

        let result = build_document(
            &FakeRenderer::new(0),
            &RustBackend::new(),
            &deck,
            &png_config(),
        );
        assert!(matches!(
            result,
            Err(DocumentError::Resolve(ResolveError::Empty(_)))
        ));
    }

    #[test]
    fn summary_display() {
        let summary = BatchSummary {
            composed: 3,
            failed: 1,
            skipped: 2,
        };
        assert_eq!(summary.to_string(), "3 composed, 1 failed, 2 skipped");
    }
}

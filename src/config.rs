//! Sheet configuration module.
//!
//! Handles loading, validating, and merging `slidesheet.toml`. User values are
//! layered over stock defaults, then individual CLI flags override the result.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [layout]
//! width = 800                  # Canvas width in pixels
//! margin = 5                   # Spacing around and between slides
//! columns = 3                  # Grid cells per row
//! # max_items = 28             # Cover + grid cap (default: columns * 9 + 1)
//! reference_size = [1280, 720] # Native slide size; sets the grid cell aspect
//! background = "#F0FFFF"       # Canvas fill (azure)
//! filter = "lanczos3"          # nearest | triangle | catmull-rom | gaussian | lanczos3
//!
//! [input]
//! slide_extension = "jpg"      # Extension of exported slide images
//! documents = ["ppt", "pptx"]  # Presentation extensions picked up by `build`
//!
//! [output]
//! extension = "jpg"            # Sheet format, written next to the document
//! quality = 90                 # JPEG quality (1-100)
//!
//! [renderer]
//! command = []                 # argv with {input} and {outdir} placeholders
//!
//! [processing]
//! max_processes = 4            # Max parallel documents (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::sheet::{Color, Dimensions, Filter, LayoutParams, Quality, validate_params};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `slidesheet.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetConfig {
    /// Canvas geometry and appearance.
    pub layout: LayoutConfig,
    /// Which files count as slides and documents.
    pub input: InputConfig,
    /// Sheet encoding.
    pub output: OutputConfig,
    /// External slide exporter.
    pub renderer: RendererConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl SheetConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_params(&self.layout_params()).map_err(|reason| {
            ConfigError::Validation(format!("layout: {reason}"))
        })?;
        if self.output.quality == 0 || self.output.quality > 100 {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        if self.input.slide_extension.trim().is_empty() {
            return Err(ConfigError::Validation(
                "input.slide_extension must not be empty".into(),
            ));
        }
        if self.input.documents.is_empty() {
            return Err(ConfigError::Validation(
                "input.documents must not be empty".into(),
            ));
        }
        if self.output.extension.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output.extension must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Build the compositor's parameters from this config.
    pub fn layout_params(&self) -> LayoutParams {
        let layout = &self.layout;
        LayoutParams {
            target_width: layout.width,
            margin: layout.margin,
            columns: layout.columns,
            max_items: layout.effective_max_items(),
            reference_item: Dimensions {
                width: layout.reference_size[0],
                height: layout.reference_size[1],
            },
            background: layout.background,
            filter: layout.filter,
        }
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.output.quality)
    }
}

/// Canvas geometry and appearance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Spacing between the canvas edge, the cover and grid cells.
    pub margin: u32,
    /// Grid cells per row.
    pub columns: u32,
    /// Maximum slides considered, cover included.
    /// When absent, defaults to `columns * 9 + 1`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    /// Native slide size as `[width, height]`.
    pub reference_size: [u32; 2],
    pub background: Color,
    pub filter: Filter,
}

impl LayoutConfig {
    pub fn effective_max_items(&self) -> usize {
        self.max_items
            .unwrap_or_else(|| LayoutParams::default_max_items(self.columns))
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let params = LayoutParams::default();
        Self {
            width: params.target_width,
            margin: params.margin,
            columns: params.columns,
            max_items: None,
            reference_size: [params.reference_item.width, params.reference_item.height],
            background: params.background,
            filter: params.filter,
        }
    }
}

/// Which files count as slides and documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Extension of the exported slide images.
    pub slide_extension: String,
    /// Presentation extensions picked up when walking directories.
    pub documents: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            slide_extension: "jpg".to_string(),
            documents: vec!["ppt".to_string(), "pptx".to_string()],
        }
    }
}

/// Sheet encoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Output extension; the sheet is written next to its document.
    pub extension: String,
    /// JPEG quality (1 = worst, 100 = best). Ignored by lossless formats.
    pub quality: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            extension: "jpg".to_string(),
            quality: Quality::default().value(),
        }
    }
}

/// External slide exporter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RendererConfig {
    /// argv with `{input}` and `{outdir}` placeholders. Empty = not configured.
    pub command: Vec<String>,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of documents processed in parallel.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SheetConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock defaults: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config from `path`, merged over stock defaults and validated.
///
/// A missing file yields the stock defaults.
pub fn load_config(path: &Path) -> Result<SheetConfig, ConfigError> {
    load_config_with(path, None)
}

/// Like [`load_config`], with `overrides` (e.g. CLI flags) merged over the file.
///
/// Layers are `defaults < file < overrides`, and only the final result is
/// validated, so an override can repair a bad file value.
pub fn load_config_with(
    path: &Path,
    overrides: Option<toml::Value>,
) -> Result<SheetConfig, ConfigError> {
    let mut merged = stock_defaults_value()?;
    if let Some(file) = load_raw_config(path)? {
        merged = merge_toml(merged, file);
    }
    if let Some(overrides) = overrides {
        merged = merge_toml(merged, overrides);
    }
    let config: SheetConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `slidesheet.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# slidesheet configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Layout
# ---------------------------------------------------------------------------
[layout]
# Canvas width in pixels. The height is computed from the content.
width = 800

# Spacing in pixels around the canvas edge, below the cover, and between
# grid cells.
margin = 5

# Number of slides per grid row below the cover.
columns = 3

# Maximum number of slides used, cover included.
# Omit to use columns * 9 + 1 (nine full rows plus the cover).
# max_items = 28

# Native size of exported slides as [width, height]. Grid cells use this
# aspect ratio; the cover always keeps its own.
reference_size = [1280, 720]

# Canvas background as #RRGGBB.
background = "#F0FFFF"

# Resampling filter: nearest, triangle, catmull-rom, gaussian, lanczos3.
filter = "lanczos3"

# ---------------------------------------------------------------------------
# Input
# ---------------------------------------------------------------------------
[input]
# Extension of the slide images written by the renderer (case-insensitive).
slide_extension = "jpg"

# Presentation extensions picked up by `slidesheet build`.
documents = ["ppt", "pptx"]

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Sheet format: jpg, png, tiff or webp. Written as <document>.<extension>.
extension = "jpg"

# JPEG quality (1 = worst, 100 = best).
quality = 90

# ---------------------------------------------------------------------------
# Slide renderer
# ---------------------------------------------------------------------------
[renderer]
# Command that exports every slide of {input} as a numbered image into
# {outdir}, e.g. Slide1.jpg, Slide2.jpg, ...
# command = ["export-slides", "{input}", "{outdir}"]
command = []

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum documents processed in parallel.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_matches_stock_layout() {
        let config = SheetConfig::default();
        assert_eq!(config.layout.width, 800);
        assert_eq!(config.layout.margin, 5);
        assert_eq!(config.layout.columns, 3);
        assert_eq!(config.layout.max_items, None);
        assert_eq!(config.layout.reference_size, [1280, 720]);
        assert_eq!(config.layout.background, Color::AZURE);
        assert_eq!(config.input.slide_extension, "jpg");
        assert_eq!(config.input.documents, vec!["ppt", "pptx"]);
        assert_eq!(config.output.extension, "jpg");
        assert_eq!(config.output.quality, 90);
        assert!(config.renderer.command.is_empty());
    }

    #[test]
    fn default_config_is_valid() {
        assert!(SheetConfig::default().validate().is_ok());
    }

    #[test]
    fn layout_params_from_defaults() {
        assert_eq!(SheetConfig::default().layout_params(), LayoutParams::default());
    }

    #[test]
    fn max_items_follows_columns_when_unset() {
        let toml = r#"
[layout]
columns = 4
"#;
        let config: SheetConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.layout_params().max_items, 37);
    }

    #[test]
    fn explicit_max_items_wins() {
        let toml = r#"
[layout]
columns = 4
max_items = 10
"#;
        let config: SheetConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.layout_params().max_items, 10);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r##"
[layout]
background = "#101010"
filter = "catmull-rom"
"##;
        let config: SheetConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.layout.background, Color::rgb(0x10, 0x10, 0x10));
        assert_eq!(config.layout.filter, Filter::CatmullRom);
        // Defaults preserved
        assert_eq!(config.layout.width, 800);
        assert_eq!(config.output.quality, 90);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml = r#"
[layout]
colums = 4
"#;
        assert!(toml::from_str::<SheetConfig>(toml).is_err());
    }

    #[test]
    fn bad_color_is_rejected() {
        let toml = r#"
[layout]
background = "azure"
"#;
        assert!(toml::from_str::<SheetConfig>(toml).is_err());
    }

    #[test]
    fn negative_margin_is_rejected() {
        let toml = r#"
[layout]
margin = -5
"#;
        assert!(toml::from_str::<SheetConfig>(toml).is_err());
    }

    #[test]
    fn validate_rejects_zero_columns() {
        let mut config = SheetConfig::default();
        config.layout.columns = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_zero_reference_size() {
        let mut config = SheetConfig::default();
        config.layout.reference_size = [1280, 0];
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_quality_out_of_range() {
        let mut config = SheetConfig::default();
        config.output.quality = 101;
        assert!(config.validate().is_err());
        config.output.quality = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_documents() {
        let mut config = SheetConfig::default();
        config.input.documents.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn effective_threads_clamps_to_cores() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let config = ProcessingConfig {
            max_processes: Some(cores + 10),
        };
        assert_eq!(effective_threads(&config), cores);
        assert_eq!(effective_threads(&ProcessingConfig::default()), cores);
        let one = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&one), 1);
    }

    // =========================================================================
    // merge_toml / load_config
    // =========================================================================

    #[test]
    fn merge_toml_overrides_nested_keys() {
        let base: toml::Value = toml::from_str("[layout]\nwidth = 800\nmargin = 5\n").unwrap();
        let overlay: toml::Value = toml::from_str("[layout]\nwidth = 1200\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["layout"]["width"].as_integer(), Some(1200));
        assert_eq!(merged["layout"]["margin"].as_integer(), Some(5));
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("slidesheet.toml")).unwrap();
        assert_eq!(config.layout.width, 800);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("slidesheet.toml");
        fs::write(
            &path,
            r#"
[layout]
width = 1024
columns = 4

[renderer]
command = ["export-slides", "{input}", "{outdir}"]
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.layout.width, 1024);
        assert_eq!(config.layout.columns, 4);
        assert_eq!(config.layout.margin, 5);
        assert_eq!(config.renderer.command.len(), 3);
    }

    #[test]
    fn load_config_validates() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("slidesheet.toml");
        fs::write(&path, "[layout]\nwidth = 8\nmargin = 5\n").unwrap();

        assert!(matches!(load_config(&path), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn overrides_apply_before_validation() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("slidesheet.toml");
        fs::write(&path, "[layout]\nwidth = 8\nmargin = 5\n").unwrap();
        let overrides: toml::Value = toml::from_str("[layout]\nwidth = 800\n").unwrap();

        let config = load_config_with(&path, Some(overrides)).unwrap();
        assert_eq!(config.layout.width, 800);
        assert_eq!(config.layout.margin, 5);
    }

    #[test]
    fn overrides_are_validated_too() {
        let tmp = TempDir::new().unwrap();
        let overrides: toml::Value = toml::from_str("[layout]\ncolumns = 0\n").unwrap();

        let result = load_config_with(&tmp.path().join("missing.toml"), Some(overrides));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn load_config_reports_bad_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("slidesheet.toml");
        fs::write(&path, "[layout\nwidth = 8\n").unwrap();

        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn stock_config_toml_parses_to_defaults() {
        let config: SheetConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SheetConfig::default();
        assert_eq!(config.layout_params(), defaults.layout_params());
        assert_eq!(config.input.documents, defaults.input.documents);
        assert_eq!(config.output.quality, defaults.output.quality);
    }
}

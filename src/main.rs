use clap::{Parser, Subcommand};
use slidesheet::render::CommandRenderer;
use slidesheet::sheet::{self, RustBackend};
use slidesheet::{batch, config, output, resolve};
use std::path::PathBuf;

/// Layout flags that override `[layout]` in the config file.
#[derive(clap::Args, Clone, Default)]
struct LayoutArgs {
    /// Canvas width in pixels
    #[arg(long, global = true)]
    width: Option<u32>,
    /// Spacing around and between slides
    #[arg(long, global = true)]
    margin: Option<u32>,
    /// Grid cells per row
    #[arg(long, global = true)]
    columns: Option<u32>,
    /// Maximum slides used, cover included
    #[arg(long, global = true)]
    max_items: Option<usize>,
}

impl LayoutArgs {
    /// The flags that were given, as a `[layout]` table to merge over the file.
    fn overrides(&self) -> Option<toml::Value> {
        let mut layout = toml::Table::new();
        if let Some(width) = self.width {
            layout.insert("width".into(), i64::from(width).into());
        }
        if let Some(margin) = self.margin {
            layout.insert("margin".into(), i64::from(margin).into());
        }
        if let Some(columns) = self.columns {
            layout.insert("columns".into(), i64::from(columns).into());
        }
        if let Some(max_items) = self.max_items {
            let max_items = i64::try_from(max_items).unwrap_or(i64::MAX);
            layout.insert("max_items".into(), max_items.into());
        }
        if layout.is_empty() {
            return None;
        }
        let mut root = toml::Table::new();
        root.insert("layout".into(), toml::Value::Table(layout));
        Some(toml::Value::Table(root))
    }
}

#[derive(Parser)]
#[command(name = "slidesheet")]
#[command(about = "Contact-sheet thumbnails from presentation slides")]
#[command(long_about = "\
Contact-sheet thumbnails from presentation slides

The first slide is drawn full width on top; the remaining slides follow in a
fixed-column grid. The canvas height is computed to fit.

  ┌──────────────────────┐
  │        cover         │
  ├──────┬──────┬────────┤
  │  2   │  3   │   4    │
  │  5   │  6   │   7    │
  └──────┴──────┴────────┘

Slides are exported by an external command (see [renderer] in the config);
'compose' and 'plan' work on an already-exported directory of numbered
images such as Slide1.jpg, Slide2.jpg, ...

Run 'slidesheet gen-config' to generate a documented slidesheet.toml.")]
#[command(version)]
struct Cli {
    /// Config file (missing file = stock defaults)
    #[arg(long, default_value = "slidesheet.toml", global = true)]
    config: PathBuf,

    #[command(flatten)]
    layout: LayoutArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render and compose every presentation found in PATHS
    Build {
        /// Presentation files or directories to walk
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Compose a directory of exported slide images
    Compose {
        /// Directory containing numbered slide images
        slides: PathBuf,
        /// Output image (format from extension)
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print the layout for a slide directory without rendering
    Plan {
        /// Directory containing numbered slide images
        slides: PathBuf,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a stock slidesheet.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let backend = RustBackend::new();

    match &cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Build { paths } => {
            let sheet_config = load_config(&cli)?;
            init_thread_pool(&sheet_config.processing);
            let renderer = CommandRenderer::new(sheet_config.renderer.command.clone());
            let discovery = batch::discover(paths, &sheet_config.input.documents);

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_batch_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            discovery.report_skipped(Some(&tx));
            let mut summary = batch::build(
                &renderer,
                &backend,
                &discovery.documents,
                &sheet_config,
                Some(tx),
            );
            summary.skipped = discovery.skipped.len();
            printer.join().ok();

            println!();
            println!("{}", summary);
            if summary.failed > 0 {
                return Err(format!("{} document(s) failed", summary.failed).into());
            }
        }
        Command::Compose { slides, output } => {
            let sheet_config = load_config(&cli)?;
            let info = batch::compose_dir(&backend, slides, output, &sheet_config)?;
            println!(
                "{} \u{2192} {} ({} slides, {}x{})",
                slides.display(),
                output.display(),
                info.slides,
                info.canvas.width,
                info.canvas.height
            );
        }
        Command::Plan { slides, json } => {
            let sheet_config = load_config(&cli)?;
            let params = sheet_config.layout_params();
            let paths = resolve::resolve(
                slides,
                &sheet_config.input.slide_extension,
                params.max_items,
            )?;
            let plan = sheet::plan(&backend, &paths, &params)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                output::print_plan(&plan);
            }
        }
    }

    Ok(())
}

/// Load the config file with layout flags layered on top.
fn load_config(cli: &Cli) -> Result<config::SheetConfig, config::ConfigError> {
    config::load_config_with(&cli.config, cli.layout.overrides())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; users can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

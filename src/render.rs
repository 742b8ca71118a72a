//! External slide rendering.
//!
//! This crate never parses presentation formats. Turning `deck.pptx` into
//! `Slide1.jpg … SlideN.jpg` is delegated to whatever exporter the user has
//! installed, behind the [`SlideRenderer`] trait.
//!
//! [`CommandRenderer`] runs a configured argv with two placeholders:
//!
//! | Token | Replaced with |
//! |---|---|
//! | `{input}` | absolute path of the presentation |
//! | `{outdir}` | directory the slides must be written to |
//!
//! For example, a LibreOffice + poppler pipeline wrapped in a script:
//!
//! ```toml
//! [renderer]
//! command = ["export-slides.sh", "{input}", "{outdir}"]
//! ```

use std::path::Path;
use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("No slide renderer configured (set renderer.command)")]
    NotConfigured,
    #[error("Failed to start renderer {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Renderer exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
}

/// Exports every slide of a document as a numbered image into `out_dir`.
pub trait SlideRenderer: Sync {
    fn render(&self, document: &Path, out_dir: &Path) -> Result<(), RenderError>;
}

/// Renderer that shells out to a user-configured command.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    argv: Vec<String>,
}

impl CommandRenderer {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }

    /// Build the argv for one document, substituting placeholders.
    fn expand(&self, document: &Path, out_dir: &Path) -> Vec<String> {
        let input = document.to_string_lossy();
        let outdir = out_dir.to_string_lossy();
        self.argv
            .iter()
            .map(|arg| arg.replace("{input}", &input).replace("{outdir}", &outdir))
            .collect()
    }
}

impl SlideRenderer for CommandRenderer {
    fn render(&self, document: &Path, out_dir: &Path) -> Result<(), RenderError> {
        let argv = self.expand(document, out_dir);
        let (program, args) = argv.split_first().ok_or(RenderError::NotConfigured)?;

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| RenderError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(RenderError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! skip talks/notes.txt: not a presentation
//! 001 talks/intro.pptx → talks/intro.jpg (12 slides, 800x1058)
//! 002 talks/broken.pptx FAILED
//!     Rendering failed: Renderer exited with exit status: 1: cannot open
//!
//! 1 composed, 1 failed, 1 skipped
//! ```
//!
//! ## Plan
//!
//! ```text
//! Canvas 800x907
//! Cover  790x444 at (5, 5)
//! Grid   7 items, 3 rows of 260x146
//!     001 (5, 454)
//!     002 (270, 454)
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure — no I/O, no side effects.

use crate::batch::BatchEvent;
use crate::sheet::{Dimensions, LayoutPlan};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn size(dims: Dimensions) -> String {
    format!("{}x{}", dims.width, dims.height)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Build progress
// ============================================================================

/// Format a single batch progress event as display lines.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Skipped { path, reason } => vec![format!("skip {}: {}", path, reason)],
        BatchEvent::Composed {
            index,
            document,
            output,
            slides,
            canvas,
        } => vec![format!(
            "{} {} \u{2192} {} ({}, {})",
            format_index(*index),
            document,
            output,
            plural(*slides, "slide"),
            size(*canvas)
        )],
        BatchEvent::Failed {
            index,
            document,
            error,
        } => vec![
            format!("{} {} FAILED", format_index(*index), document),
            format!("{}{}", indent(1), error),
        ],
    }
}

// ============================================================================
// Layout plan
// ============================================================================

/// Format a layout plan: canvas, cover, then one line per grid cell.
pub fn format_plan(plan: &LayoutPlan) -> Vec<String> {
    let mut lines = vec![
        format!("Canvas {}", size(plan.canvas)),
        format!(
            "Cover  {}x{} at ({}, {})",
            plan.cover.width, plan.cover.height, plan.cover.x, plan.cover.y
        ),
    ];

    if plan.items.is_empty() {
        lines.push("Grid   none".to_string());
        return lines;
    }

    lines.push(format!(
        "Grid   {}, {} of {}",
        plural(plan.items.len(), "item"),
        plural(plan.rows as usize, "row"),
        size(plan.cell)
    ));
    for (i, rect) in plan.items.iter().enumerate() {
        lines.push(format!(
            "{}{} ({}, {})",
            indent(1),
            format_index(i + 1),
            rect.x,
            rect.y
        ));
    }
    lines
}

pub fn print_plan(plan: &LayoutPlan) {
    for line in format_plan(plan) {
        println!("{}", line);
    }
}

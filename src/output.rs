//! CLI output formatting for `build` and `check`.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! 2 written, 1 skipped
//! 1 asset copied
//! ```
//!
//! With `--verbose` the summary is preceded by the paths themselves:
//!
//! ```text
//! Written
//!     dist/index.html
//!     dist/blog/hello/index.html
//! Skipped
//!     dist/about/index.html
//! Assets
//!     dist/static/style.css
//! ```
//!
//! Per-item errors go to stderr, one per line, exactly as recorded.
//!
//! ## Check
//!
//! ```text
//! content/posts/x.md: Post missing required 'date' in front matter.
//! 1 problem found
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout or stderr.
//! Format functions are pure: no I/O, no side effects.

use crate::pipeline::BuildResult;
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {plural}")
    }
}

fn section(lines: &mut Vec<String>, heading: &str, entries: impl IntoIterator<Item = String>) {
    let mut entries = entries.into_iter().peekable();
    if entries.peek().is_none() {
        return;
    }
    lines.push(heading.to_string());
    lines.extend(entries.map(|e| format!("{}{}", indent(1), e)));
}

// ============================================================================
// Build
// ============================================================================

/// Format the build report for stdout.
pub fn format_build_output(result: &BuildResult, detailed: bool) -> Vec<String> {
    let mut lines = Vec::new();
    if detailed {
        section(&mut lines, "Written", result.written.iter().cloned());
        section(&mut lines, "Skipped", result.skipped.iter().cloned());
        section(
            &mut lines,
            "Assets",
            result.copied.iter().map(|p| p.display().to_string()),
        );
    }
    lines.push(format!(
        "{} written, {} skipped",
        result.written.len(),
        result.skipped.len()
    ));
    if !result.copied.is_empty() {
        lines.push(format!(
            "{} copied",
            plural(result.copied.len(), "asset", "assets")
        ));
    }
    lines
}

pub fn print_build_output(result: &BuildResult, detailed: bool) {
    for line in format_build_output(result, detailed) {
        println!("{}", line);
    }
}

/// Recorded errors, one line each, for stderr.
pub fn format_errors(errors: &[String]) -> Vec<String> {
    errors.iter().map(|e| e.lines().collect::<Vec<_>>().join(" ")).collect()
}

pub fn print_errors(errors: &[String]) {
    for line in format_errors(errors) {
        eprintln!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format diagnostics; the last line states the verdict.
pub fn format_check_output(messages: &[String], project_root: &Path) -> Vec<String> {
    if messages.is_empty() {
        return vec![format!("No problems found in {}", project_root.display())];
    }
    let mut lines = format_errors(messages);
    lines.push(format!(
        "{} found",
        plural(messages.len(), "problem", "problems")
    ));
    lines
}

pub fn print_check_output(messages: &[String], project_root: &Path) {
    let lines = format_check_output(messages, project_root);
    if messages.is_empty() {
        for line in lines {
            println!("{}", line);
        }
    } else {
        for line in lines {
            eprintln!("{}", line);
        }
    }
}

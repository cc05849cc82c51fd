//! CLI output formatting.
//!
//! Output is **key-first**: each template is listed by the URL it is cached
//! under, with the file it came from as an indented `Source:` line. That is
//! the mapping people need when a `templateUrl` doesn't resolve at runtime.
//!
//! ## Check
//!
//! ```text
//! Templates (2)
//! 001 tpl/home.html
//!     Source: src/app/home.html
//! 002 tpl/users/list.html
//!     Source: src/app/users/list.html
//! ```
//!
//! ## Build
//!
//! The check listing, followed by the artifact:
//!
//! ```text
//! Output
//!     dist/templates.js (1532 bytes)
//!     sha256: 9f86d081884c7d65...
//! ```
//!
//! Each `format_*` function returns `Vec<String>` and does no I/O; the
//! `print_*` wrappers write to stdout.

use crate::host::PassReport;
use crate::types::ResolvedFile;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Listing of resolved templates, keyed by cache URL.
pub fn format_check_output(files: &[ResolvedFile]) -> Vec<String> {
    let mut lines = vec![format!("Templates ({})", files.len())];
    if files.is_empty() {
        lines.push(format!("{}(no templates matched)", indent(1)));
    }
    for (i, file) in files.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), file.url));
        lines.push(format!("{}Source: {}", indent(1), file.path.display()));
    }
    lines
}

/// Template listing plus the written artifact.
pub fn format_pass_output(report: &PassReport, out_dir: &Path) -> Vec<String> {
    let mut lines = format_check_output(&report.files);
    lines.push(String::new());
    lines.push("Output".to_string());
    lines.push(format!(
        "{}{} ({} bytes)",
        indent(1),
        out_dir.join(&report.filename).display(),
        report.size
    ));
    lines.push(format!("{}sha256: {}", indent(1), report.digest));
    lines
}

pub fn print_check_output(files: &[ResolvedFile]) {
    for line in format_check_output(files) {
        println!("{}", line);
    }
}

pub fn print_pass_output(report: &PassReport, out_dir: &Path) {
    for line in format_pass_output(report, out_dir) {
        println!("{}", line);
    }
}

//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Build
//!
//! One line per written file, then a summary:
//!
//! ```text
//! >> build/about.html
//! >> build/blog/2024/first-post.html
//! >> build/css/site.css
//! Built 2 pages, copied 1 file, 4 directories
//! ```
//!
//! Directories are silent unless an existing one was wiped:
//!
//! ```text
//! Replaced build
//! ```
//!
//! ## Dry run
//!
//! ```text
//! mkdir   build
//! render  root/about.rst → build/about.html
//! copy    root/css/site.css → build/css/site.css
//!
//! 1 page to render, 1 file to copy, 1 directory
//! ```
//!
//! # Architecture
//!
//! Each kind of output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::build::{BuildEvent, BuildReport};
use crate::plan::Action;
use crate::sync::SyncOutcome;
use std::path::Path;

/// `1 page`, `2 pages`.
fn count(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {plural}")
    }
}

// ============================================================================
// Build progress
// ============================================================================

/// Format a single build progress event as display lines.
pub fn format_event(event: &BuildEvent) -> Vec<String> {
    match event {
        BuildEvent::Directory {
            path,
            outcome: SyncOutcome::Replaced,
        } => vec![format!("Replaced {}", path.display())],
        BuildEvent::Directory { .. } => Vec::new(),
        BuildEvent::Rendered { dst, .. } | BuildEvent::Copied { dst, .. } => {
            vec![format!(">> {}", dst.display())]
        }
    }
}

pub fn print_event(event: &BuildEvent) {
    for line in format_event(event) {
        println!("{}", line);
    }
}

/// Closing summary of a completed build.
pub fn format_report(report: &BuildReport) -> Vec<String> {
    vec![format!(
        "Built {}, copied {}, {}",
        count(report.rendered, "page", "pages"),
        count(report.copied, "file", "files"),
        count(report.directories, "directory", "directories"),
    )]
}

pub fn print_report(report: &BuildReport) {
    for line in format_report(report) {
        println!("{}", line);
    }
}

/// Message for a build the operator chose not to run.
pub fn format_declined(path: &Path) -> Vec<String> {
    vec![format!("Build cancelled; {} left untouched.", path.display())]
}

pub fn print_declined(path: &Path) {
    for line in format_declined(path) {
        println!("{}", line);
    }
}

// ============================================================================
// Dry run
// ============================================================================

/// Format a build plan: one line per action, then totals.
pub fn format_plan(actions: &[Action]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut report = BuildReport::default();

    for action in actions {
        lines.push(match action {
            Action::CreateDir { dst } => {
                report.directories += 1;
                format!("mkdir   {}", dst.display())
            }
            Action::Render { src, dst, .. } => {
                report.rendered += 1;
                format!("render  {} → {}", src.display(), dst.display())
            }
            Action::Copy { src, dst } => {
                report.copied += 1;
                format!("copy    {} → {}", src.display(), dst.display())
            }
        });
    }

    lines.push(String::new());
    lines.push(format!(
        "{} to render, {} to copy, {}",
        count(report.rendered, "page", "pages"),
        count(report.copied, "file", "files"),
        count(report.directories, "directory", "directories"),
    ));
    lines
}

pub fn print_plan(actions: &[Action]) {
    for line in format_plan(actions) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn count_pluralizes() {
        assert_eq!(count(0, "page", "pages"), "0 pages");
        assert_eq!(count(1, "page", "pages"), "1 page");
        assert_eq!(count(2, "directory", "directories"), "2 directories");
    }

    #[test]
    fn written_files_get_arrow_lines() {
        let src = Path::new("root/a.md");
        let dst = Path::new("build/a.html");
        assert_eq!(
            format_event(&BuildEvent::Rendered { src, dst }),
            vec![">> build/a.html"]
        );
        let dst = Path::new("build/site.css");
        assert_eq!(
            format_event(&BuildEvent::Copied { src, dst }),
            vec![">> build/site.css"]
        );
    }

    #[test]
    fn created_directories_are_silent() {
        let event = BuildEvent::Directory {
            path: Path::new("build/sub"),
            outcome: SyncOutcome::Created,
        };
        assert!(format_event(&event).is_empty());
    }

    #[test]
    fn replaced_directory_is_reported() {
        let event = BuildEvent::Directory {
            path: Path::new("build"),
            outcome: SyncOutcome::Replaced,
        };
        assert_eq!(format_event(&event), vec!["Replaced build"]);
    }

    #[test]
    fn report_summary() {
        let report = BuildReport {
            directories: 4,
            rendered: 2,
            copied: 1,
        };
        assert_eq!(
            format_report(&report),
            vec!["Built 2 pages, copied 1 file, 4 directories"]
        );
    }

    #[test]
    fn declined_message() {
        assert_eq!(
            format_declined(Path::new("build")),
            vec!["Build cancelled; build left untouched."]
        );
    }

    #[test]
    fn plan_listing() {
        let actions = vec![
            Action::CreateDir {
                dst: PathBuf::from("build"),
            },
            Action::Render {
                src: PathBuf::from("root/about.rst"),
                dst: PathBuf::from("build/about.html"),
                extension: "rst".to_string(),
            },
            Action::Copy {
                src: PathBuf::from("root/site.css"),
                dst: PathBuf::from("build/site.css"),
            },
        ];
        assert_eq!(
            format_plan(&actions),
            vec![
                "mkdir   build",
                "render  root/about.rst → build/about.html",
                "copy    root/site.css → build/site.css",
                "",
                "1 page to render, 1 file to copy, 1 directory",
            ]
        );
    }

    #[test]
    fn empty_plan_still_has_totals() {
        assert_eq!(
            format_plan(&[]),
            vec!["", "0 pages to render, 0 files to copy, 0 directories"]
        );
    }
}

//! CLI output formatting: progress lines and the end-of-run summary.
//!
//! Each piece has a `format_*` function (returns `String` or `Vec<String>`)
//! for testability and, where the CLI needs it, a `print_*` wrapper that
//! writes to stdout. Format functions are pure: no I/O, no side effects.
//!
//! # Output Format
//!
//! ```text
//! [1/3] Resizing IMG_0001.jpg
//! [2/3] Resizing IMG_0002.jpg
//! [3/3] Resizing scan.png
//!
//! Resize complete
//! Evaluated 3 images: 2 resized, 1 skipped.
//! Saved 4MB.
//! ```
//!
//! A canceled run reports how far it got instead:
//!
//! ```text
//! Resize canceled
//! The resize was canceled while in progress; 2 images were resized first.
//! ```

use crate::batch::{CancelToken, ProgressMonitor};
use crate::report::BatchReport;
use std::path::Path;

/// Human-readable byte count, keeping the sign: `512 bytes`, `3KB`, `-2MB`.
///
/// Rounds down to whole units.
pub fn format_size(bytes: i64) -> String {
    let abs = bytes.unsigned_abs();
    let size = if abs < 1024 {
        format!("{} bytes", abs)
    } else if abs < 1024 * 1024 {
        format!("{}KB", abs / 1024)
    } else {
        format!("{}MB", abs / 1024 / 1024)
    };
    if bytes < 0 { format!("-{}", size) } else { size }
}

/// Note shown while a file is being worked on.
pub fn progress_note(file: &Path) -> String {
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());
    format!("Resizing {}", name)
}

/// `[done/total] note`
pub fn format_progress(done: usize, total: usize, note: &str) -> String {
    format!("[{}/{}] {}", done, total, note)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{} {}", n, one)
    } else {
        format!("{} {}", n, many)
    }
}

/// Summary lines for a finished (or canceled) batch.
pub fn format_summary(report: &BatchReport) -> Vec<String> {
    if report.canceled {
        return vec![
            "Resize canceled".to_string(),
            format!(
                "The resize was canceled while in progress; {} resized first.",
                plural(report.resized, "image was", "images were")
            ),
        ];
    }

    let mut lines = vec![
        "Resize complete".to_string(),
        format!(
            "Evaluated {}: {} resized, {} skipped.",
            plural(report.processed, "image", "images"),
            report.resized,
            report.skipped
        ),
    ];
    if report.failed > 0 {
        lines.push(format!(
            "{} encountered (see log output).",
            plural(report.failed, "problem was", "problems were")
        ));
    }
    if report.resized > 0 {
        if report.bytes_saved >= 0 {
            lines.push(format!("Saved {}.", format_size(report.bytes_saved)));
        } else {
            lines.push(format!("Grew by {}.", format_size(-report.bytes_saved)));
        }
    }
    lines
}

pub fn print_summary(report: &BatchReport) {
    for line in format_summary(report) {
        println!("{}", line);
    }
}

/// Result line for the single-file command.
pub fn format_resize_one(file: &Path, bytes_saved: i64) -> String {
    let change = if bytes_saved >= 0 {
        format!("saved {}", format_size(bytes_saved))
    } else {
        format!("grew by {}", format_size(-bytes_saved))
    };
    format!("Resized {} ({})", file.display(), change)
}

/// Terminal progress monitor: one line per finished file.
pub struct ConsoleProgress {
    total: usize,
    note: String,
    token: CancelToken,
}

impl ConsoleProgress {
    pub fn new(total: usize, token: CancelToken) -> Self {
        Self {
            total,
            note: String::new(),
            token,
        }
    }
}

impl ProgressMonitor for ConsoleProgress {
    fn set_note(&mut self, note: &str) {
        self.note = note.to_string();
    }

    fn set_progress(&mut self, done: usize) {
        println!("{}", format_progress(done, self.total, &self.note));
    }

    fn is_canceled(&self) -> bool {
        self.token.is_canceled()
    }

    fn close(&mut self) {
        println!();
    }
}

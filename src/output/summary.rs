//! End-of-run summary

use crate::state::DoneReason;
use std::path::PathBuf;
use std::time::Duration;

/// Figures reported once the crawl has finished
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub pages_visited: usize,
    pub images_found: usize,
    pub done: DoneReason,
    /// `None` when no report was written
    pub report_path: Option<PathBuf>,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Pages visited per second of wall time
    pub fn pages_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.pages_visited as f64 / secs
    }
}

/// Formats a summary for the terminal
pub fn format_summary(summary: &RunSummary) -> String {
    let mut out = String::new();
    out.push_str("=== Crawl Summary ===\n\n");
    out.push_str(&format!("  Pages visited: {}\n", summary.pages_visited));
    out.push_str(&format!("  Images found: {}\n", summary.images_found));
    out.push_str(&format!("  Stopped because: {}\n", summary.done));
    if !summary.done.is_natural_end() {
        out.push_str("  Coverage: partial, the site was not walked to its end\n");
    }
    out.push_str(&format!(
        "  Elapsed: {:.1}s ({:.2} pages/sec)\n",
        summary.elapsed.as_secs_f64(),
        summary.pages_per_second()
    ));
    match &summary.report_path {
        Some(path) => out.push_str(&format!("  Report: {}\n", path.display())),
        None => out.push_str("  Report: not written (no images)\n"),
    }
    out
}

/// Prints a summary to stdout
pub fn print_summary(summary: &RunSummary) {
    print!("{}", format_summary(summary));
}

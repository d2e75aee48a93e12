//! Output module for run artifacts
//!
//! This module handles:
//! - The per-run output folder holding the log and the report
//! - Rendering the HTML gallery report
//! - The end-of-run summary

mod report;
mod run_dir;
mod summary;

pub use report::{render_report, write_report, REPORT_FILE_NAME};
pub use run_dir::{RunDirectory, LOG_FILE_NAME, RUN_DIR_FORMAT};
pub use summary::{format_summary, print_summary, RunSummary};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while writing run artifacts
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Output path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

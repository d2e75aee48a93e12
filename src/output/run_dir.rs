use crate::output::{OutputError, OutputResult};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory-name format of a run folder
pub const RUN_DIR_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Name of the run log inside a run folder
pub const LOG_FILE_NAME: &str = "crawler.log";

/// Per-run output folder `<output_dir>/<YYYYMMDD_HHMMSS>/`
#[derive(Debug, Clone)]
pub struct RunDirectory {
    path: PathBuf,
    started_at: DateTime<Local>,
}

impl RunDirectory {
    /// Creates the folder for a run started at `started_at`
    ///
    /// Parent directories are created as needed. An existing folder with the
    /// same name is reused.
    pub fn create(output_dir: &Path, started_at: DateTime<Local>) -> OutputResult<Self> {
        if output_dir.exists() && !output_dir.is_dir() {
            return Err(OutputError::NotADirectory(output_dir.to_path_buf()));
        }
        let path = output_dir.join(started_at.format(RUN_DIR_FORMAT).to_string());
        fs::create_dir_all(&path)?;
        Ok(Self { path, started_at })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn started_at(&self) -> &DateTime<Local> {
        &self.started_at
    }

    /// Path of the run log
    pub fn log_path(&self) -> PathBuf {
        self.path.join(LOG_FILE_NAME)
    }
}

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use anyhow::{Context, Result};
use env_logger::{Env, Target, WriteStyle};

pub fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("rmanhwa").join("rmanhwa.log"))
}

/// The terminal belongs to the UI, so log records go to a file.
pub fn init(log_file: Option<PathBuf>) -> Result<PathBuf> {
    let path = log_file
        .or_else(default_log_path)
        .context("No cache directory available for the log file")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    env_logger::Builder::from_env(Env::new().filter_or("RMANHWA_LOG", "info"))
        .target(Target::Pipe(Box::new(file)))
        .write_style(WriteStyle::Never)
        .try_init()
        .context("Failed to initialise logger")?;
    Ok(path)
}

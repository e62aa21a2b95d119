//! Location of the stored session.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;

/// Resolve the data directory, creating it if needed.
pub fn data_dir(overridden: Option<&Path>) -> Result<PathBuf> {
    let dir = match overridden {
        Some(dir) => dir.to_path_buf(),
        None => ProjectDirs::from("", "", "marquee")
            .context("Could not determine data directory")?
            .data_dir()
            .to_path_buf(),
    };

    fs::create_dir_all(&dir).context("Failed to create data directory")?;
    Ok(dir)
}

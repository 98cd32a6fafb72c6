use anyhow::{anyhow, Result};
use std::fs;
use std::path::PathBuf;

const APP_DIR: &str = "lead-scout";

pub struct AppPaths;

impl AppPaths {
    pub fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow!("Cannot determine data directory"))?
            .join(APP_DIR);

        fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    /// Directory for timestamped session logs, falling back to the temp dir
    pub fn log_dir() -> PathBuf {
        Self::data_dir()
            .map(|dir| dir.join("logs"))
            .unwrap_or_else(|_| std::env::temp_dir().join(APP_DIR))
    }
}

use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use crate::utils::app_paths::AppPaths;

/// Global session log file
static FILE_LOGGER: OnceLock<FileLogger> = OnceLock::new();

/// Appends formatted log lines to a per-session file
pub struct FileLogger {
    log_file: Mutex<Option<File>>,
    log_path: PathBuf,
}

impl FileLogger {
    /// Open `lead-scout_<timestamp>.log` in `log_dir`.
    ///
    /// If the file cannot be opened the logger still works but drops
    /// everything written to it.
    pub fn new(log_dir: &Path) -> Self {
        let _ = std::fs::create_dir_all(log_dir);

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let log_path = log_dir.join(format!("lead-scout_{}.log", timestamp));

        #[cfg(unix)]
        {
            let latest_path = log_dir.join("latest.log");
            let _ = std::fs::remove_file(&latest_path);
            let _ = std::os::unix::fs::symlink(&log_path, &latest_path);
        }

        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .ok();

        Self {
            log_file: Mutex::new(log_file),
            log_path,
        }
    }

    pub fn log(&self, timestamp: &str, level: &str, target: &str, message: &str) {
        let mut file_opt = self.log_file.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(ref mut file) = *file_opt {
            let log_line = format!("[{}] {} [{}] {}\n", timestamp, level, target, message);
            let _ = file.write_all(log_line.as_bytes());
            // Flush per line so a crash in raw mode still leaves a usable log
            let _ = file.flush();
        }
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn flush(&self) {
        let mut file_opt = self.log_file.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(ref mut file) = *file_opt {
            let _ = file.flush();
        }
    }
}

/// Initialize the global file logger under the application log directory
pub fn init_file_logger() -> &'static FileLogger {
    FILE_LOGGER.get_or_init(|| FileLogger::new(&AppPaths::log_dir()))
}

pub fn get_file_logger() -> Option<&'static FileLogger> {
    FILE_LOGGER.get()
}

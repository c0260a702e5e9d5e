//! Setup run log
//!
//! Mirrors every command and its output into a timestamped log file in the
//! system temp directory, for troubleshooting failed installs after the fact.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const LOG_PREFIX: &str = "gcsmount-setup-";
const LOG_SUFFIX: &str = ".log";

/// Number of run logs kept in the temp directory
pub const DEFAULT_KEEP: usize = 10;

/// Append-only log file for a single setup run
#[derive(Debug)]
pub struct RunLog {
    file: File,
    log_path: PathBuf,
}

impl RunLog {
    /// Create a new log in the system temp directory
    pub fn new() -> Result<Self, String> {
        Self::in_dir(&std::env::temp_dir())
    }

    /// Create a new timestamped log inside `dir`
    pub fn in_dir(dir: &Path) -> Result<Self, String> {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let log_path = dir.join(format!("{}{}{}", LOG_PREFIX, timestamp, LOG_SUFFIX));

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .map_err(|e| format!("Failed to create log file at {:?}: {}", log_path, e))?;

        let log = Self { file, log_path };

        log.info("=== gcsmount setup log ===");
        log.info(&format!("Version: {}", env!("CARGO_PKG_VERSION")));
        log.info(&format!(
            "Started: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        log.info("");

        Ok(log)
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn info(&self, message: &str) {
        self.log_message("INFO", message);
    }

    pub fn warn(&self, message: &str) {
        self.log_message("WARN", message);
    }

    pub fn error(&self, message: &str) {
        self.log_message("ERROR", message);
    }

    fn log_message(&self, level: &str, message: &str) {
        let timestamp = chrono::Local::now().format("%H:%M:%S");
        let formatted = if level.is_empty() {
            format!("[{}] {}", timestamp, message)
        } else {
            format!("[{}] [{}] {}", timestamp, level, message)
        };

        // Logging must never abort a setup step
        let mut file = &self.file;
        let _ = writeln!(file, "{}", formatted);
        let _ = file.flush();
    }

    pub fn log_stdout(&self, output: &str) {
        for line in output.lines() {
            self.log_message("", &format!("  stdout: {}", line));
        }
    }

    pub fn log_stderr(&self, output: &str) {
        for line in output.lines() {
            self.log_message("", &format!("  stderr: {}", line));
        }
    }

    /// Remove all but the newest `keep_count` run logs from the temp directory
    pub fn cleanup_old_logs(keep_count: usize) -> Result<(), String> {
        Self::cleanup_old_logs_in(&std::env::temp_dir(), keep_count)
    }

    pub fn cleanup_old_logs_in(dir: &Path, keep_count: usize) -> Result<(), String> {
        let mut log_files: Vec<PathBuf> = std::fs::read_dir(dir)
            .map_err(|e| format!("Failed to read log directory: {}", e))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with(LOG_PREFIX) && n.ends_with(LOG_SUFFIX))
                    .unwrap_or(false)
            })
            .collect();

        // Oldest first; names carry the timestamp so they break mtime ties
        log_files.sort_by_key(|path| {
            let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok();
            (modified, path.clone())
        });

        if log_files.len() > keep_count {
            let to_remove = log_files.len() - keep_count;
            for path in log_files.iter().take(to_remove) {
                let _ = std::fs::remove_file(path);
            }
        }

        Ok(())
    }

    pub fn finalize(&self) {
        self.info("");
        self.info(&format!(
            "Finished: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
    }
}

impl Drop for RunLog {
    fn drop(&mut self) {
        let _ = self.file.flush();
    }
}

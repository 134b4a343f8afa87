use crate::{LogError, LogLevel, Logger, set_logger};
use dirs::data_dir;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

pub struct AdvancedLogger {
    level: AtomicU8,
    log_file: Option<PathBuf>,
}

impl AdvancedLogger {
    pub fn new(level: LogLevel, log_file: Option<PathBuf>) -> Self {
        if let Some(file) = &log_file {
            if file.exists() {
                archive_previous(file);
            }
            if let Some(parent) = file.parent() {
                if !parent.exists() {
                    std::fs::create_dir_all(parent).unwrap_or_else(|e| {
                        eprintln!("Failed to create log directory: {e}");
                    });
                }
            }

            if let Err(e) = std::fs::File::create(file) {
                eprintln!("Failed to create log file {}: {e}", file.display());
            }
        }
        AdvancedLogger {
            level: AtomicU8::new(level.severity()),
            log_file,
        }
    }

    /// Default log location for `app`: `<data_dir>/<app>/latest.log`.
    pub fn default_log_file(app: &str) -> Option<PathBuf> {
        data_dir().map(|dir| dir.join(app).join("latest.log"))
    }

    /// Install a logger for `app` as the global logger.
    pub fn init(app: &str, log_level: LogLevel, to_file: bool) -> Result<(), LogError> {
        let log_file = if to_file {
            Self::default_log_file(app)
        } else {
            None
        };
        let logger = Arc::new(AdvancedLogger::new(log_level, log_file));

        set_logger(logger)?;

        Ok(())
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }
}

/// Rename the previous session's log to a timestamped name and compress it.
fn archive_previous(file: &Path) {
    let mut renamed_path = file.to_path_buf();
    renamed_path.set_file_name(format!(
        "{}.log",
        chrono::Local::now().format("%d%m%Y_%H%M%S")
    ));

    if let Err(e) = std::fs::rename(file, &renamed_path) {
        eprintln!("Failed to rename existing log file: {e}");
        return;
    }

    let mut compressed_file = renamed_path.clone();
    compressed_file.set_extension("7z");

    match sevenz_rust2::compress_to_path(&renamed_path, &compressed_file) {
        Ok(()) => {
            std::fs::remove_file(&renamed_path).unwrap_or_else(|e| {
                eprintln!("Failed to remove old log file: {e}");
            });
        }
        // keep the plain copy rather than lose it
        Err(e) => eprintln!("Failed to compress file: {e}"),
    }
}

fn log_to_file(log_file: &Path, message: &str) -> std::io::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(log_file)?;
    writeln!(file, "{message}")?;
    Ok(())
}

impl Logger for AdvancedLogger {
    fn set_level(&self, level: LogLevel) {
        self.level.store(level.severity(), Ordering::Relaxed);
    }

    fn level(&self) -> LogLevel {
        LogLevel::from_severity(self.level.load(Ordering::Relaxed))
    }

    fn log(&self, level: LogLevel, message: &str) {
        if !self.level().allows(level) {
            return;
        }
        let timestamp = chrono::Local::now().format("%d%m%Y %H:%M:%S");
        println!("{timestamp} - [{level}] - {message}");
        if let Some(ref file) = self.log_file {
            let write_msg = format!("{} - [{}] - {}", timestamp, level.raw_str(), message);
            log_to_file(file, &write_msg).unwrap_or_else(|e| {
                eprintln!("Failed to write to log file: {e}");
            });
        }
    }
}

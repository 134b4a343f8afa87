//! # Logging Library
//!
//! Process-global logging with configurable levels and colored output.
//! The logger is installed once and shared by every thread, so background
//! tasks running on tokio workers log through the same sink as the caller.
use colored::Colorize;
use std::fmt::Display;
use std::sync::{Arc, OnceLock};

/// Submodule containing advanced logger implementations
pub mod logger;

static LOGGER: OnceLock<Arc<dyn Logger + Send + Sync>> = OnceLock::new();

/// Sets the global logger instance for the application
///
/// # Arguments
///
/// * `logger` - A thread-safe reference to a logger implementation
///
/// # Returns
///
/// * `Ok(())` if the logger was successfully set
/// * `Err(LogError::AlreadyInitialized)` if a logger has already been initialized
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use log::logger::AdvancedLogger;
/// use log::{set_logger, LogLevel};
///
/// let logger = Arc::new(AdvancedLogger::new(LogLevel::Debug, None));
/// set_logger(logger).expect("Failed to initialize logger");
/// ```
pub fn set_logger(logger: Arc<dyn Logger + Send + Sync>) -> Result<(), LogError> {
    LOGGER
        .set(logger)
        .map_err(|_| LogError::AlreadyInitialized)
}

/// Retrieves the current global logger, if one is set
pub fn logger() -> Option<Arc<dyn Logger + Send + Sync>> {
    LOGGER.get().cloned()
}

/// Errors that can occur during logger operations
#[derive(Debug)]
pub enum LogError {
    /// Returned when attempting to initialize a logger after one has already been set
    AlreadyInitialized,
    /// Returned when attempting to use a logger before one has been set
    NoLogger,
}

impl Display for LogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogError::AlreadyInitialized => write!(f, "Logger has already been initialized"),
            LogError::NoLogger => write!(f, "No logger set"),
        }
    }
}

impl std::error::Error for LogError {}

/// Trait that all logger implementations must implement
pub trait Logger: Send + Sync {
    /// Logs a message at INFO level
    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }
    /// Logs a message at WARNING level
    fn warning(&self, message: &str) {
        self.log(LogLevel::Warning, message);
    }
    /// Logs a message at ERROR level
    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
    /// Logs a message at CRITICAL level
    fn critical(&self, message: &str) {
        self.log(LogLevel::Critical, message);
    }
    /// Logs a message at DEBUG level
    fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }
    /// Logs a message with a specified log level
    fn log(&self, level: LogLevel, message: &str);
    /// Sets the minimum logging level that will be output
    fn set_level(&self, level: LogLevel);
    /// Current minimum level
    fn level(&self) -> LogLevel;
}

/// Logging levels, ordered by increasing severity.
///
/// `NoLog` used as a threshold suppresses all output. The default level is Info.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug information for development purposes
    Debug,
    #[default]
    /// Standard informational messages
    Info,
    /// Warning messages indicating potential issues
    Warning,
    /// Error messages for recoverable failures
    Error,
    /// Critical messages for severe errors that might cause program termination
    Critical,
    /// Special level that suppresses all logging
    NoLog,
}

impl LogLevel {
    /// Returns the string representation of the log level
    pub fn raw_str(&self) -> &'static str {
        match self {
            LogLevel::NoLog => "NOLOG",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }

    /// Numeric severity, `Debug` lowest.
    pub fn severity(&self) -> u8 {
        match self {
            LogLevel::Debug => 0,
            LogLevel::Info => 1,
            LogLevel::Warning => 2,
            LogLevel::Error => 3,
            LogLevel::Critical => 4,
            LogLevel::NoLog => 5,
        }
    }

    pub fn from_severity(value: u8) -> Self {
        match value {
            0 => LogLevel::Debug,
            1 => LogLevel::Info,
            2 => LogLevel::Warning,
            3 => LogLevel::Error,
            4 => LogLevel::Critical,
            _ => LogLevel::NoLog,
        }
    }

    /// Whether a message at `message_level` passes this threshold
    pub fn allows(&self, message_level: LogLevel) -> bool {
        message_level != LogLevel::NoLog && message_level.severity() >= self.severity()
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warning" | "warn" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            "critical" => Ok(LogLevel::Critical),
            "nolog" | "off" => Ok(LogLevel::NoLog),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

impl PartialOrd for LogLevel {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.severity().cmp(&other.severity()))
    }
}

impl Display for LogLevel {
    /// Provides colored text formatting for each log level
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use LogLevel::*;
        let level_str = match self {
            NoLog => String::new(),
            Info => format!("{}", "INFO".blue().bold()),
            Warning => format!("{}", "WARNING".yellow().bold()),
            Error => format!("{}", "ERROR".red().bold()),
            Critical => format!("{}", "CRITICAL".bright_red().bold()),
            Debug => format!("{}", "DEBUG".cyan().bold()),
        };
        write!(f, "{level_str}")
    }
}

/// Logs a message with the specified log level
///
/// # Example
///
/// ```
/// use log::{log, LogLevel};
///
/// log!(LogLevel::Warning, "This is a {} message", "warning");
/// ```
#[macro_export]
macro_rules! log {
    ($level:expr, $($arg:tt)*) => {{
        if let Some(logger) = $crate::logger() {
            let message = format!($($arg)*);
            logger.log($level, &message);
        }
    }};
}

/// Logs a message at INFO level
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {{
        $crate::log!($crate::LogLevel::Info, $($arg)*);
    }};
}

/// Logs a message at WARNING level
#[macro_export]
macro_rules! warning {
    ($($arg:tt)*) => {{
        $crate::log!($crate::LogLevel::Warning, $($arg)*);
    }};
}

/// Logs a message at ERROR level
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {{
        $crate::log!($crate::LogLevel::Error, $($arg)*);
    }};
}

/// Logs a message at CRITICAL level
#[macro_export]
macro_rules! critical {
    ($($arg:tt)*) => {{
        $crate::log!($crate::LogLevel::Critical, $($arg)*);
    }};
}

/// Logs a message at DEBUG level
///
/// # Example
///
/// ```
/// use log::debug;
///
/// debug!("probe {} for session {}", 3, "S-1");
/// ```
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {{
        $crate::log!($crate::LogLevel::Debug, $($arg)*);
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::AdvancedLogger;

    fn ensure_logger(level: LogLevel) {
        if let Some(logger) = logger() {
            logger.set_level(level);
        } else {
            let logger = Arc::new(AdvancedLogger::new(level, None));
            set_logger(logger).unwrap_or(());
        }
    }

    #[test]
    fn test_advance_logger() {
        ensure_logger(LogLevel::Debug);

        debug!("This is a debug message");
        info!("This is an info message");
        warning!("This is a warning message");
        error!("This is an error message");
        critical!("This is a critical message");
    }

    #[test]
    fn test_threshold_filtering() {
        assert!(LogLevel::Warning.allows(LogLevel::Error));
        assert!(LogLevel::Warning.allows(LogLevel::Warning));
        assert!(!LogLevel::Warning.allows(LogLevel::Info));
        assert!(!LogLevel::Warning.allows(LogLevel::Debug));
        assert!(LogLevel::Debug.allows(LogLevel::Critical));
        assert!(!LogLevel::NoLog.allows(LogLevel::Critical));
        assert!(!LogLevel::Debug.allows(LogLevel::NoLog));
    }

    #[test]
    fn test_level_parse_and_roundtrip() {
        assert_eq!("warn".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!("DEBUG".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert!("loud".parse::<LogLevel>().is_err());
        for level in [LogLevel::Debug, LogLevel::Info, LogLevel::Critical, LogLevel::NoLog] {
            assert_eq!(LogLevel::from_severity(level.severity()), level);
        }
    }

    #[test]
    fn test_logger_visible_from_other_threads() {
        ensure_logger(LogLevel::Info);
        let seen = std::thread::spawn(|| logger().is_some()).join().unwrap();
        assert!(seen);
    }

    #[test]
    #[should_panic(expected = "AlreadyInitialized")]
    fn test_logger_init_once() {
        let logger1 = Arc::new(AdvancedLogger::new(LogLevel::Debug, None));
        let _ = set_logger(logger1);

        let logger2 = Arc::new(AdvancedLogger::new(LogLevel::Info, None));
        set_logger(logger2).unwrap(); // This should panic
    }
}

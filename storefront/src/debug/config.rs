//! Debug configuration from environment variables

use std::path::PathBuf;

/// Log file name inside the log directory (daily rotation appends the date).
pub const LOG_FILE_NAME: &str = "storefront.log";
pub const DEFAULT_LOG_LEVEL: &str = "storefront=info,warn";

/// Debug system configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugConfig {
    /// Log file path
    pub log_file: PathBuf,
    /// Log level filter (e.g., "storefront=debug,info")
    pub log_level: String,
    /// Log directory (for rotation)
    pub log_dir: PathBuf,
    /// Mirror log output to stderr
    pub log_to_stderr: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self::from_vars(None, None, None)
    }
}

impl DebugConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("RUST_LOG").ok(),
            std::env::var("STOREFRONT_LOG_DIR").ok(),
            std::env::var("STOREFRONT_LOG_STDERR").ok(),
        )
    }

    fn from_vars(log_level: Option<String>, log_dir: Option<String>, stderr: Option<String>) -> Self {
        let log_dir = log_dir.map(PathBuf::from).unwrap_or_else(|| PathBuf::from("logs"));

        Self {
            log_file: log_dir.join(LOG_FILE_NAME),
            log_level: log_level.unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_dir,
            log_to_stderr: stderr
                .map(|v| v == "1")
                .unwrap_or(cfg!(feature = "debug-mode")),
        }
    }

    /// Check if debug logging is enabled
    pub fn is_debug_enabled(&self) -> bool {
        self.log_level.contains("debug") || self.is_trace_enabled()
    }

    /// Check if trace logging is enabled
    pub fn is_trace_enabled(&self) -> bool {
        self.log_level.contains("trace")
    }
}

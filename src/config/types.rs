// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub browser: BrowserConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
}

/// Listener and served directory
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory to serve; the executable's directory when unset
    #[serde(default)]
    pub root: Option<String>,
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Browser auto-open behavior
#[derive(Debug, Deserialize, Clone)]
pub struct BrowserConfig {
    pub open: bool,
    /// Host name used in the URL handed to the browser
    pub host: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (common, combined, json, or custom pattern)
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// Timeouts, all in seconds
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    /// Idle wait for the next request on a kept-alive connection; 0 disables keep-alive
    pub keep_alive_timeout: u64,
    /// Opt-in upper bound on a connection's lifetime; 0 (the default) means unbounded
    pub connection_timeout: u64,
    /// How long in-flight connections may take to finish after an interrupt
    pub shutdown_timeout: u64,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub index_files: Vec<String>,
    pub directory_listing: bool,
}

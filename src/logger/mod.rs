//! Logger module
//!
//! Provides logging utilities for the dev server including:
//! - Server lifecycle logging (startup banner, browser launch, shutdown)
//! - Access logging with multiple formats
//! - Leveled error and warning logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::LoggingConfig;
use crate::error::BrowserLaunchError;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};

/// Severity threshold for lifecycle messages (access lines are governed by `access_log`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    /// Parse a level name; unknown names fall back to `Info`
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "error" => Self::Error,
            "warn" | "warning" => Self::Warn,
            "debug" | "trace" => Self::Debug,
            _ => Self::Info,
        }
    }

    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Error,
            1 => Self::Warn,
            3 => Self::Debug,
            _ => Self::Info,
        }
    }
}

static LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &LoggingConfig) -> std::io::Result<()> {
    set_level(LogLevel::parse(&config.level));
    writer::init(
        config.access_log_file.as_deref(),
        config.error_log_file.as_deref(),
    )
}

pub fn set_level(level: LogLevel) {
    LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn level() -> LogLevel {
    LogLevel::from_u8(LEVEL.load(Ordering::Relaxed))
}

fn enabled(level: LogLevel) -> bool {
    level <= self::level()
}

/// Write to info log
fn write_info(message: &str) {
    if writer::is_initialized() {
        writer::get().write_info(message);
    } else {
        println!("{message}");
    }
}

/// Write to error log
fn write_error(message: &str) {
    if writer::is_initialized() {
        writer::get().write_error(message);
    } else {
        eprintln!("{message}");
    }
}

/// Write to access log specifically
fn write_access(message: &str) {
    if writer::is_initialized() {
        writer::get().write_access(message);
    } else {
        println!("{message}");
    }
}

pub fn log_server_start(url: &str, local_addr: &SocketAddr, root: &Path) {
    if !enabled(LogLevel::Info) {
        return;
    }
    write_info("======================================");
    write_info(&format!("✓ Server started: {url}"));
    write_info(&format!("Listening on: {local_addr}"));
    write_info(&format!("Serving: {}", root.display()));
    write_info("Caching disabled (no-store, no-cache, must-revalidate)");
    write_info("Press Ctrl+C to stop");
    write_info("======================================\n");
}

pub fn log_browser_opening(url: &str) {
    if enabled(LogLevel::Info) {
        write_info(&format!("[BROWSER] Opening {url} in the default browser..."));
    }
}

/// Browser launch failed: report the cause, then tell the user what to do
pub fn log_browser_fallback(url: &str, err: &BrowserLaunchError) {
    log_warning(&format!("Could not open a browser: {err}"));
    write_info(&format!("[BROWSER] Please open the browser manually: {url}"));
}

pub fn log_shutdown_requested(signal: &str) {
    write_info(&format!("\n[SHUTDOWN] {signal} received, stopping server..."));
}

pub fn log_draining(active: usize) {
    if active > 0 && enabled(LogLevel::Info) {
        write_info(&format!(
            "[SHUTDOWN] Waiting for {active} open connection(s) to finish"
        ));
    }
}

pub fn log_shutdown_complete() {
    write_info("[SHUTDOWN] ✓ Server stopped");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    log_debug(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    if enabled(LogLevel::Warn) {
        write_error(&format!("[WARN] Failed to serve connection: {err:?}"));
    }
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    if enabled(LogLevel::Warn) {
        write_error(&format!("[WARN] {message}"));
    }
}

pub fn log_debug(message: &str) {
    if enabled(LogLevel::Debug) {
        write_info(&format!("[DEBUG] {message}"));
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(LogLevel::parse("error"), LogLevel::Error);
        assert_eq!(LogLevel::parse("WARN"), LogLevel::Warn);
        assert_eq!(LogLevel::parse(" warning "), LogLevel::Warn);
        assert_eq!(LogLevel::parse("debug"), LogLevel::Debug);
        assert_eq!(LogLevel::parse("info"), LogLevel::Info);
        assert_eq!(LogLevel::parse("verbose"), LogLevel::Info);
    }

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Info < LogLevel::Debug);
        for level in [LogLevel::Error, LogLevel::Warn, LogLevel::Info, LogLevel::Debug] {
            assert_eq!(LogLevel::from_u8(level as u8), level);
        }
    }
}

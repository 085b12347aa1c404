//! Error types
//!
//! Startup failures are fatal and end the process; browser launch failures
//! are reported and otherwise ignored.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitStatus;

/// Anything that prevents the server from starting to serve.
#[derive(thiserror::Error, Debug)]
pub enum StartupError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid listen address '{address}': {source}")]
    InvalidAddress {
        address: String,
        source: std::net::AddrParseError,
    },

    #[error("Root directory '{}' is not accessible: {source}", path.display())]
    RootInaccessible { path: PathBuf, source: io::Error },

    #[error("Root '{}' is not a directory", path.display())]
    RootNotDirectory { path: PathBuf },

    #[error("Failed to bind {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },

    #[error("Failed to open log file: {0}")]
    Logger(#[source] io::Error),

    #[error("Failed to build async runtime: {0}")]
    Runtime(#[source] io::Error),

    #[error("Failed to register signal handler: {0}")]
    Signal(#[source] io::Error),
}

/// The default browser could not be opened.
#[derive(thiserror::Error, Debug)]
pub enum BrowserLaunchError {
    #[error("Failed to run '{program}': {source}")]
    Spawn { program: String, source: io::Error },

    #[error("'{program}' exited with {status}")]
    Exit { program: String, status: ExitStatus },

    #[error("No browser launcher is known for this platform")]
    Unsupported,
}

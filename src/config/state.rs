// Application state module
// Shared, read-mostly state handed to every connection

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::types::Config;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Canonical served directory
    pub root: PathBuf,
    // Cached config values for fast access
    pub access_log: bool,
    active_connections: AtomicUsize,
}

impl AppState {
    pub fn new(config: Config, root: PathBuf) -> Self {
        let access_log = config.logging.access_log;
        Self {
            config,
            root,
            access_log,
            active_connections: AtomicUsize::new(0),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Record a newly accepted connection, returning the previous count
    pub fn connection_opened(&self) -> usize {
        self.active_connections.fetch_add(1, Ordering::SeqCst)
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::SeqCst)
    }
}

// Configuration module entry point
// Loads devserve.toml on top of built-in defaults and resolves the served root

mod state;
mod types;

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use crate::error::StartupError;

// Re-export public types
pub use state::AppState;
pub use types::{
    BrowserConfig, Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig,
};

/// Config file looked up in the launch directory (extension resolved by the `config` crate)
pub const DEFAULT_CONFIG_NAME: &str = "devserve";

/// Default listen port
pub const DEFAULT_PORT: u16 = 8000;

impl Config {
    /// Load `devserve.toml` (if present) from the current directory
    pub fn load() -> Result<Self, StartupError> {
        Self::load_from(DEFAULT_CONFIG_NAME)
    }

    /// Load configuration from specified file path (without extension)
    pub fn load_from(config_path: &str) -> Result<Self, StartupError> {
        let settings = with_defaults()?
            .add_source(config::File::with_name(config_path).required(false))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Built-in defaults only, no file lookup
    pub fn defaults() -> Result<Self, StartupError> {
        Ok(with_defaults()?.build()?.try_deserialize()?)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, StartupError> {
        let ip: IpAddr =
            self.server
                .host
                .parse()
                .map_err(|source| StartupError::InvalidAddress {
                    address: self.server.host.clone(),
                    source,
                })?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// URL handed to the browser once the listener is bound on `port`
    pub fn browser_url(&self, port: u16) -> String {
        format!("http://{}:{port}", self.browser.host)
    }

    /// Resolve the served directory to a canonical path and make sure it can be listed.
    pub fn resolve_root(&self) -> Result<PathBuf, StartupError> {
        let candidate = match &self.server.root {
            Some(root) => PathBuf::from(root),
            None => executable_dir()?,
        };
        check_root(&candidate)
    }
}

fn with_defaults(
) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", i64::from(DEFAULT_PORT))?
        .set_default("browser.open", true)?
        .set_default("browser.host", "localhost")?
        .set_default("logging.level", "info")?
        .set_default("logging.access_log", true)?
        .set_default("logging.access_log_format", "common")?
        .set_default("performance.keep_alive_timeout", 75)?
        .set_default("performance.connection_timeout", 0)?
        .set_default("performance.shutdown_timeout", 5)?
        .set_default("http.server_name", concat!("devserve/", env!("CARGO_PKG_VERSION")))?
        .set_default("http.index_files", vec!["index.html", "index.htm"])?
        .set_default("http.directory_listing", true)
}

fn executable_dir() -> Result<PathBuf, StartupError> {
    let exe = std::env::current_exe().map_err(|source| StartupError::RootInaccessible {
        path: PathBuf::from("<current executable>"),
        source,
    })?;
    Ok(exe
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf))
}

fn check_root(candidate: &Path) -> Result<PathBuf, StartupError> {
    let inaccessible = |source| StartupError::RootInaccessible {
        path: candidate.to_path_buf(),
        source,
    };

    let root = candidate.canonicalize().map_err(inaccessible)?;
    if !root.is_dir() {
        return Err(StartupError::RootNotDirectory { path: root });
    }
    // Readability check: listing the root must work before we accept requests
    std::fs::read_dir(&root).map_err(inaccessible)?;
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::defaults().unwrap();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 8000);
        assert!(cfg.server.root.is_none());
        assert!(cfg.browser.open);
        assert_eq!(cfg.http.index_files, vec!["index.html", "index.htm"]);
        assert!(cfg.http.directory_listing);
        assert_eq!(cfg.logging.access_log_format, "common");
        // Transfers are never cut off unless a lifetime cap is configured
        assert_eq!(cfg.performance.connection_timeout, 0);
        assert_eq!(cfg.performance.keep_alive_timeout, 75);
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("custom.toml");
        std::fs::write(
            &file,
            "[server]\nport = 9123\nroot = \"public\"\n\n[browser]\nopen = false\n",
        )
        .unwrap();

        let cfg = Config::load_from(file.with_extension("").to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9123);
        assert_eq!(cfg.server.root.as_deref(), Some("public"));
        assert!(!cfg.browser.open);
        // Untouched sections keep their defaults
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.performance.connection_timeout, 0);
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let cfg = Config::load_from("definitely/not/here/devserve").unwrap();
        assert_eq!(cfg.server.port, DEFAULT_PORT);
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::defaults().unwrap();
        assert_eq!(cfg.socket_addr().unwrap(), "0.0.0.0:8000".parse().unwrap());

        cfg.server.host = "::1".to_string();
        cfg.server.port = 9000;
        assert_eq!(cfg.socket_addr().unwrap(), "[::1]:9000".parse().unwrap());

        cfg.server.host = "localhost".to_string();
        assert!(matches!(
            cfg.socket_addr(),
            Err(StartupError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_browser_url() {
        let cfg = Config::defaults().unwrap();
        assert_eq!(cfg.browser_url(8000), "http://localhost:8000");
    }

    #[test]
    fn test_resolve_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::defaults().unwrap();
        cfg.server.root = Some(dir.path().to_string_lossy().into_owned());
        assert_eq!(cfg.resolve_root().unwrap(), dir.path().canonicalize().unwrap());
    }

    #[test]
    fn test_resolve_root_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::defaults().unwrap();
        cfg.server.root = Some(dir.path().join("gone").to_string_lossy().into_owned());
        assert!(matches!(
            cfg.resolve_root(),
            Err(StartupError::RootInaccessible { .. })
        ));
    }

    #[test]
    fn test_resolve_root_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("app.js");
        std::fs::write(&file, "console.log(1)").unwrap();
        let mut cfg = Config::defaults().unwrap();
        cfg.server.root = Some(file.to_string_lossy().into_owned());
        assert!(matches!(
            cfg.resolve_root(),
            Err(StartupError::RootNotDirectory { .. })
        ));
    }

    #[test]
    fn test_default_root_is_executable_dir() {
        let cfg = Config::defaults().unwrap();
        let exe_dir = std::env::current_exe().unwrap();
        let expected = exe_dir.parent().unwrap().canonicalize().unwrap();
        assert_eq!(cfg.resolve_root().unwrap(), expected);
    }
}

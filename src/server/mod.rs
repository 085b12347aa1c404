// Server module entry point
// Binds the listener, opens the browser and runs the accept loop until shutdown

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module is exposed as server_loop
#[path = "loop.rs"]
pub mod server_loop;

use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::browser::BrowserLauncher;
use crate::config::{AppState, Config};
use crate::error::{BrowserLaunchError, StartupError};
use crate::logger;

pub use listener::bind_listener;
pub use server_loop::run_accept_loop;

/// A bound static file server.
///
/// Owns the listening socket from `bind` until `serve` returns; the socket is
/// released on every exit path of `serve`, or when the value is dropped.
pub struct DevServer {
    listener: TcpListener,
    state: Arc<AppState>,
    local_addr: SocketAddr,
    url: String,
}

impl DevServer {
    /// Resolve the root and bind the listener. Nothing is served yet.
    pub fn bind(config: Config) -> Result<Self, StartupError> {
        let root = config.resolve_root()?;
        let addr = config.socket_addr()?;

        let listener =
            bind_listener(addr).map_err(|source| StartupError::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| StartupError::Bind { addr, source })?;
        let url = config.browser_url(local_addr.port());

        Ok(Self {
            listener,
            state: Arc::new(AppState::new(config, root)),
            local_addr,
            url,
        })
    }

    /// Bind, print the startup banner, then open the browser when `browser.open` is set.
    ///
    /// A bind failure returns before the launcher is touched.
    pub fn start<B: BrowserLauncher>(config: Config, launcher: B) -> Result<Self, StartupError> {
        let server = Self::bind(config)?;
        logger::log_server_start(&server.url, &server.local_addr, server.root());

        if server.state.config.browser.open {
            // Detached: the outcome is only logged
            drop(server.launch_browser(launcher));
        }
        Ok(server)
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// URL the browser is pointed at
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Canonical served directory
    pub fn root(&self) -> &Path {
        self.state.root()
    }

    /// Open the server URL with `launcher` on the blocking pool.
    ///
    /// Failures are logged with a request to open the URL manually; the
    /// returned handle only matters to callers that want the outcome.
    pub fn launch_browser<B: BrowserLauncher>(
        &self,
        launcher: B,
    ) -> JoinHandle<Result<(), BrowserLaunchError>> {
        let url = self.url.clone();
        logger::log_browser_opening(&url);

        tokio::task::spawn_blocking(move || {
            let result = launcher.open(&url);
            if let Err(e) = &result {
                logger::log_browser_fallback(&url, e);
            }
            result
        })
    }

    /// Serve requests until `shutdown` resolves, then drain open connections.
    pub async fn serve<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        run_accept_loop(self.listener, self.state, shutdown).await;
    }
}

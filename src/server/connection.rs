// Connection handling module
// Serves a single accepted TCP connection on its own task

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::server::graceful::GracefulShutdown;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Register an accepted connection and hand it to a serving task.
///
/// The connection is tracked by `graceful`, so shutdown can wait for it.
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    graceful: &GracefulShutdown,
) {
    state.connection_opened();
    logger::log_connection_accepted(&peer_addr);

    handle_connection(stream, peer_addr, Arc::clone(state), graceful);
}

/// Serve one connection in a spawned task.
///
/// This function:
/// 1. Wraps the TCP stream in `TokioIo`
/// 2. Configures HTTP/1.1 keep-alive and the idle header-read timeout
/// 3. Serves the connection with the request handler, watched by `graceful`
/// 4. Caps the connection's lifetime at `connection_timeout` when one is configured
/// 5. Decrements the active connection counter when done
fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    graceful: &GracefulShutdown,
) {
    let io = TokioIo::new(stream);
    let performance = &state.config.performance;
    let lifetime = Duration::from_secs(performance.connection_timeout);

    let mut builder = http1::Builder::new();
    builder
        .timer(TokioTimer::new())
        .keep_alive(performance.keep_alive_timeout > 0);
    if performance.keep_alive_timeout > 0 {
        builder.header_read_timeout(Duration::from_secs(performance.keep_alive_timeout));
    }

    let service_state = Arc::clone(&state);
    let conn = builder.serve_connection(
        io,
        service_fn(move |req| {
            let state = Arc::clone(&service_state);
            async move { handler::handle_request(req, state, peer_addr).await }
        }),
    );
    let conn = graceful.watch(conn);

    tokio::spawn(async move {
        let result = if lifetime.is_zero() {
            Ok(conn.await)
        } else {
            tokio::time::timeout(lifetime, conn).await
        };

        match result {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                // Clients closing idle keep-alive connections is routine
                if !err.is_incomplete_message() && !err.is_timeout() {
                    logger::log_connection_error(&err);
                }
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Connection from {peer_addr} closed after {} seconds",
                    lifetime.as_secs()
                ));
            }
        }

        state.connection_closed();
    });
}

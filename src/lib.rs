//! devserve: a no-cache static file server for previewing a local asset bundle.
//!
//! Serves the directory next to the executable (or `server.root`) on port 8000,
//! stamps every response with no-cache headers, opens the default browser and
//! stops cleanly on Ctrl+C.

pub mod browser;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

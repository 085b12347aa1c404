//! HTTP protocol layer module
//!
//! Content types, cache headers and response builders, independent of how
//! URL paths are mapped to files.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used items
pub use cache::apply_no_cache_headers;
pub use response::{
    build_301_response, build_304_response, build_404_response, build_501_response,
    build_file_response, build_html_response, FileMeta,
};

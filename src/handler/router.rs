//! Request dispatch module
//!
//! Entry point for HTTP request processing: method validation, static file
//! dispatch, and the headers every response must carry.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, IF_MODIFIED_SINCE, IF_NONE_MATCH, REFERER, SERVER, USER_AGENT};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    /// Raw (still percent-encoded) URL path
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_modified_since: Option<&'a str>,
    /// `If-None-Match` takes precedence over `If-Modified-Since` even though we send no `ETag`
    pub has_if_none_match: bool,
}

impl<'a> RequestContext<'a> {
    pub fn from_parts(parts: &'a Parts) -> Self {
        Self {
            path: parts.uri.path(),
            query: parts.uri.query(),
            is_head: parts.method == Method::HEAD,
            if_modified_since: header_str(parts, IF_MODIFIED_SINCE),
            has_if_none_match: parts.headers.contains_key(IF_NONE_MATCH),
        }
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    // Request bodies are never read
    let (parts, _body) = req.into_parts();

    let mut response = match check_http_method(&parts.method) {
        Some(resp) => resp,
        None => {
            let ctx = RequestContext::from_parts(&parts);
            static_files::serve(&ctx, &state).await
        }
    };

    decorate_response(&mut response, &state);

    if state.access_log {
        log_access(&parts, &response, &state, peer_addr, started);
    }

    Ok(response)
}

/// Only GET and HEAD are served; everything else is answered with 501
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        _ => {
            logger::log_warning(&format!("Method not supported: {method}"));
            Some(http::build_501_response(method.as_str()))
        }
    }
}

/// Headers attached to every response, whatever its status
fn decorate_response(response: &mut Response<Full<Bytes>>, state: &AppState) {
    let headers = response.headers_mut();
    http::apply_no_cache_headers(headers);
    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        headers.insert(SERVER, server);
    }
}

fn log_access(
    parts: &Parts,
    response: &Response<Full<Bytes>>,
    state: &AppState,
    peer_addr: SocketAddr,
    started: Instant,
) {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        parts.method.to_string(),
        parts.uri.path().to_string(),
    );
    entry.query = parts.uri.query().map(ToString::to_string);
    entry.http_version = version_label(parts.version).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
    entry.referer = header_str(parts, REFERER).map(ToString::to_string);
    entry.user_agent = header_str(parts, USER_AGENT).map(ToString::to_string);
    entry.elapsed = started.elapsed();

    logger::log_access(&entry, &state.config.logging.access_log_format);
}

fn header_str(parts: &Parts, name: hyper::header::HeaderName) -> Option<&str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

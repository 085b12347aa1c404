//! HTTP response building module
//!
//! Builders for every status the dev server answers with. No-cache headers
//! are not set here; the router adds them to whatever leaves the handler.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{ALLOW, CONTENT_LENGTH, CONTENT_TYPE, LAST_MODIFIED, LOCATION};
use hyper::{Response, StatusCode};

/// Metadata for a file response body
pub struct FileMeta<'a> {
    pub content_type: &'a str,
    pub last_modified: Option<String>,
}

/// Build 200 OK for file contents; HEAD keeps the headers and drops the body
pub fn build_file_response(data: Bytes, meta: &FileMeta<'_>, is_head: bool) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, meta.content_type)
        .header(CONTENT_LENGTH, content_length);
    if let Some(last_modified) = &meta.last_modified {
        builder = builder.header(LAST_MODIFIED, last_modified);
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error("200", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build generic HTML response
pub fn build_html_response(content: String, is_head: bool) -> Response<Full<Bytes>> {
    build_file_response(
        Bytes::from(content),
        &FileMeta {
            content_type: "text/html; charset=utf-8",
            last_modified: None,
        },
        is_head,
    )
}

/// Build 301 redirect, used to add the trailing slash to directory URLs
pub fn build_301_response(location: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header(LOCATION, location)
        .header(CONTENT_LENGTH, 0)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("301", &e);
            build_404_response()
        })
}

/// Build 304 Not Modified response
pub fn build_304_response(last_modified: Option<&str>) -> Response<Full<Bytes>> {
    let mut builder = Response::builder().status(StatusCode::NOT_MODIFIED);
    if let Some(last_modified) = last_modified {
        builder = builder.header(LAST_MODIFIED, last_modified);
    }
    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("304", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    text_response(StatusCode::NOT_FOUND, "404 Not Found")
}

/// Build 501 Not Implemented for methods other than GET/HEAD
pub fn build_501_response(method: &str) -> Response<Full<Bytes>> {
    let mut response = text_response(
        StatusCode::NOT_IMPLEMENTED,
        &format!("501 Unsupported method ('{method}')"),
    );
    response
        .headers_mut()
        .insert(ALLOW, hyper::header::HeaderValue::from_static("GET, HEAD"));
    response
}

fn text_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    let body = Bytes::from(message.to_owned());
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(CONTENT_LENGTH, body.len())
        .body(Full::new(body.clone()))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            let mut fallback = Response::new(Full::new(body));
            *fallback.status_mut() = status;
            fallback
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_bytes(response: Response<Full<Bytes>>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_file_response() {
        let meta = FileMeta {
            content_type: "text/css; charset=utf-8",
            last_modified: Some("Sun, 06 Nov 1994 08:49:37 GMT".to_string()),
        };
        let response = build_file_response(Bytes::from_static(b"body{}"), &meta, false);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/css; charset=utf-8");
        assert_eq!(response.headers()[CONTENT_LENGTH], "6");
        assert_eq!(response.headers()[LAST_MODIFIED], "Sun, 06 Nov 1994 08:49:37 GMT");
        assert_eq!(body_bytes(response).await, "body{}");
    }

    #[tokio::test]
    async fn test_head_keeps_length_but_not_body() {
        let meta = FileMeta {
            content_type: "application/json",
            last_modified: None,
        };
        let response = build_file_response(Bytes::from_static(b"{\"a\":1}"), &meta, true);
        assert_eq!(response.headers()[CONTENT_LENGTH], "7");
        assert!(response.headers().get(LAST_MODIFIED).is_none());
        assert!(body_bytes(response).await.is_empty());
    }

    #[test]
    fn test_redirect_response() {
        let response = build_301_response("/assets/?v=1");
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[LOCATION], "/assets/?v=1");
    }

    #[tokio::test]
    async fn test_error_responses() {
        let not_found = build_404_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_bytes(not_found).await, "404 Not Found");

        let unsupported = build_501_response("POST");
        assert_eq!(unsupported.status(), StatusCode::NOT_IMPLEMENTED);
        assert_eq!(unsupported.headers()[ALLOW], "GET, HEAD");
        assert_eq!(
            body_bytes(unsupported).await,
            "501 Unsupported method ('POST')"
        );
    }
}

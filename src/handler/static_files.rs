//! Static file serving module
//!
//! Maps URL paths onto the served root: files, index files, trailing-slash
//! redirects for directories, and conditional GETs via `If-Modified-Since`.

use crate::config::AppState;
use crate::handler::listing;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime, FileMeta};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use percent_encoding::percent_decode_str;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Serve whatever `ctx.path` names under the root
pub async fn serve(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    let target = translate_path(state.root(), ctx.path);

    // Missing files are the common case, no need to log them
    let Ok(metadata) = fs::metadata(&target).await else {
        return http::build_404_response();
    };

    if !is_within_root(&target, state.root()).await {
        logger::log_warning(&format!(
            "Path escapes served root, refusing: {} -> {}",
            ctx.path,
            target.display()
        ));
        return http::build_404_response();
    }

    if metadata.is_dir() {
        return serve_directory(ctx, state, &target).await;
    }

    // A file addressed like a directory does not exist
    if ctx.path.ends_with('/') {
        return http::build_404_response();
    }

    serve_file(ctx, &target, &metadata).await
}

/// Turn a raw URL path into a filesystem path under `root`
///
/// The path is percent-decoded to raw bytes and normalised like a POSIX
/// path: empty and `.` segments vanish, `..` removes the previous segment and
/// stops at the root. Surviving segments that carry a path separator or
/// drive prefix of their own are then dropped, so the result never climbs
/// above `root`.
pub fn translate_path(root: &Path, raw_path: &str) -> PathBuf {
    let decoded: Vec<u8> = percent_decode_str(raw_path).collect();

    let mut segments: Vec<&[u8]> = Vec::new();
    for segment in decoded.split(|&b| b == b'/') {
        match segment {
            b"" | b"." => {}
            b".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    segments
        .into_iter()
        .filter(|segment| is_plain_segment(segment))
        .fold(root.to_path_buf(), |mut target, segment| {
            push_segment(&mut target, segment);
            target
        })
}

fn is_plain_segment(segment: &[u8]) -> bool {
    !segment
        .iter()
        .any(|&b| b == b'\\' || b == 0 || (cfg!(windows) && b == b':'))
}

/// Unix file names are bytes, so names that are not UTF-8 stay reachable
#[cfg(unix)]
fn push_segment(target: &mut PathBuf, segment: &[u8]) {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    target.push(OsStr::from_bytes(segment));
}

#[cfg(not(unix))]
fn push_segment(target: &mut PathBuf, segment: &[u8]) {
    target.push(&*String::from_utf8_lossy(segment));
}

/// Symlinks may still point outside the root; check where the target really lives
async fn is_within_root(target: &Path, root: &Path) -> bool {
    match fs::canonicalize(target).await {
        Ok(canonical) => canonical.starts_with(root),
        Err(_) => false,
    }
}

async fn serve_directory(
    ctx: &RequestContext<'_>,
    state: &AppState,
    dir: &Path,
) -> Response<Full<Bytes>> {
    if !ctx.path.ends_with('/') {
        return http::build_301_response(&slash_redirect_location(ctx));
    }

    for index_file in &state.config.http.index_files {
        let index_path = dir.join(index_file);
        if let Ok(metadata) = fs::metadata(&index_path).await {
            if metadata.is_file() {
                return serve_file(ctx, &index_path, &metadata).await;
            }
        }
    }

    if state.config.http.directory_listing {
        listing::serve_listing(ctx, dir).await
    } else {
        http::build_404_response()
    }
}

/// `/docs?x=1` becomes `/docs/?x=1`
fn slash_redirect_location(ctx: &RequestContext<'_>) -> String {
    match ctx.query {
        Some(query) => format!("{}/?{query}", ctx.path),
        None => format!("{}/", ctx.path),
    }
}

async fn serve_file(
    ctx: &RequestContext<'_>,
    path: &Path,
    metadata: &Metadata,
) -> Response<Full<Bytes>> {
    let modified = metadata.modified().ok();
    let last_modified = modified.map(cache::format_http_date);

    if !ctx.has_if_none_match {
        if let Some(modified) = modified {
            if cache::not_modified_since(ctx.if_modified_since, modified) {
                return http::build_304_response(last_modified.as_deref());
            }
        }
    }

    let content = match fs::read(path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!("Failed to read file '{}': {e}", path.display()));
            return http::build_404_response();
        }
    };

    let meta = FileMeta {
        content_type: mime::content_type_for(path),
        last_modified,
    };
    http::build_file_response(Bytes::from(content), &meta, ctx.is_head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use http_body_util::BodyExt;
    use hyper::header::{CONTENT_TYPE, LAST_MODIFIED, LOCATION};
    use hyper::StatusCode;

    fn ctx(path: &str) -> RequestContext<'_> {
        RequestContext {
            path,
            query: None,
            is_head: false,
            if_modified_since: None,
            has_if_none_match: false,
        }
    }

    fn state_for(root: &Path, configure: impl FnOnce(&mut Config)) -> AppState {
        let mut config = Config::defaults().unwrap();
        configure(&mut config);
        AppState::new(config, root.canonicalize().unwrap())
    }

    async fn body(response: Response<Full<Bytes>>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[test]
    fn test_translate_path() {
        let root = Path::new("/srv/bundle");
        assert_eq!(translate_path(root, "/"), PathBuf::from("/srv/bundle"));
        assert_eq!(
            translate_path(root, "/js/app.js"),
            PathBuf::from("/srv/bundle/js/app.js")
        );
        assert_eq!(
            translate_path(root, "/my%20models/cube.glb"),
            PathBuf::from("/srv/bundle/my models/cube.glb")
        );
    }

    #[test]
    fn test_translate_path_clamps_traversal_at_root() {
        let root = Path::new("/srv/bundle");
        assert_eq!(
            translate_path(root, "/../../etc/passwd"),
            PathBuf::from("/srv/bundle/etc/passwd")
        );
        assert_eq!(
            translate_path(root, "/%2e%2e/%2E%2E/secret"),
            PathBuf::from("/srv/bundle/secret")
        );
        assert_eq!(
            translate_path(root, "/a/./b//c"),
            PathBuf::from("/srv/bundle/a/b/c")
        );
        assert_eq!(
            translate_path(root, "/..%5c..%5cwin.ini"),
            PathBuf::from("/srv/bundle")
        );
        assert_eq!(
            translate_path(root, "/js/..%2f..%2f..%2fsecret"),
            PathBuf::from("/srv/bundle/secret")
        );
    }

    #[test]
    fn test_translate_path_resolves_parent_segments() {
        let root = Path::new("/srv/bundle");
        assert_eq!(
            translate_path(root, "/a/../b.txt"),
            PathBuf::from("/srv/bundle/b.txt")
        );
        assert_eq!(
            translate_path(root, "/viewer/js/../css/./site.css"),
            PathBuf::from("/srv/bundle/viewer/css/site.css")
        );
        // A dropped segment still counts as the parent of a following `..`
        assert_eq!(
            translate_path(root, "/x/a%5cb/../c"),
            PathBuf::from("/srv/bundle/x/c")
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_translate_path_keeps_non_utf8_bytes() {
        use std::os::unix::ffi::OsStrExt;

        let target = translate_path(Path::new("/srv/bundle"), "/caf%E9.txt");
        assert_eq!(target.file_name().unwrap().as_bytes(), b"caf\xe9.txt");
    }

    #[tokio::test]
    async fn test_parent_segment_reaches_sibling_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();
        std::fs::write(dir.path().join("b.txt"), b"B").unwrap();
        let state = state_for(dir.path(), |_| {});

        let response = serve(&ctx("/a/../b.txt"), &state).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response).await, "B");
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_serves_non_utf8_file_name() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(OsStr::from_bytes(b"caf\xe9.txt")), b"latin-1").unwrap();
        let state = state_for(dir.path(), |_| {});

        let response = serve(&ctx("/caf%E9.txt"), &state).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response).await, "latin-1");
    }

    #[tokio::test]
    async fn test_serves_file_bytes_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let bytes: Vec<u8> = (0..=255).collect();
        std::fs::create_dir(dir.path().join("bin")).unwrap();
        std::fs::write(dir.path().join("bin/blob.dat"), &bytes).unwrap();
        let state = state_for(dir.path(), |_| {});

        let response = serve(&ctx("/bin/blob.dat"), &state).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/octet-stream");
        assert!(response.headers().contains_key(LAST_MODIFIED));
        assert_eq!(body(response).await, bytes);
    }

    #[tokio::test]
    async fn test_directory_without_slash_redirects() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("viewer")).unwrap();
        let state = state_for(dir.path(), |_| {});

        let response = serve(&ctx("/viewer"), &state).await;
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[LOCATION], "/viewer/");

        let mut with_query = ctx("/viewer");
        with_query.query = Some("file=a.unitypackage");
        let response = serve(&with_query, &state).await;
        assert_eq!(
            response.headers()[LOCATION],
            "/viewer/?file=a.unitypackage"
        );
    }

    #[tokio::test]
    async fn test_directory_serves_index_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.htm"), b"<p>htm</p>").unwrap();
        std::fs::write(dir.path().join("index.html"), b"<p>html</p>").unwrap();
        let state = state_for(dir.path(), |_| {});

        let response = serve(&ctx("/"), &state).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
        assert_eq!(body(response).await, "<p>html</p>");
    }

    #[tokio::test]
    async fn test_directory_listing_toggle() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"hi").unwrap();

        let listed = state_for(dir.path(), |_| {});
        let response = serve(&ctx("/"), &listed).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body(response).await;
        assert!(std::str::from_utf8(&html).unwrap().contains("readme.txt"));

        let unlisted = state_for(dir.path(), |c| c.http.directory_listing = false);
        let response = serve(&ctx("/"), &unlisted).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_file_with_trailing_slash_is_404() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.js"), b"1").unwrap();
        let state = state_for(dir.path(), |_| {});

        let response = serve(&ctx("/app.js/"), &state).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_if_modified_since() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("style.css"), b"body{}").unwrap();
        let state = state_for(dir.path(), |_| {});

        let future = cache::format_http_date(
            std::time::SystemTime::now() + std::time::Duration::from_secs(3600),
        );
        let mut conditional = ctx("/style.css");
        conditional.if_modified_since = Some(future.as_str());
        let response = serve(&conditional, &state).await;
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert!(body(response).await.is_empty());

        // If-None-Match wins over If-Modified-Since
        conditional.has_if_none_match = true;
        let response = serve(&conditional, &state).await;
        assert_eq!(response.status(), StatusCode::OK);

        let mut stale = ctx("/style.css");
        stale.if_modified_since = Some("Sun, 06 Nov 1994 08:49:37 GMT");
        let response = serve(&stale, &state).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_out_of_root_is_refused() {
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret.txt"), b"top secret").unwrap();
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("escape")).unwrap();
        let state = state_for(dir.path(), |_| {});

        let response = serve(&ctx("/escape/secret.txt"), &state).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

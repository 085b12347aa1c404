//! MIME type detection module
//!
//! Maps a file's extension to the Content-Type sent with it.

use std::path::Path;

/// Sent when nothing better is known
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Content-Type for a file path, judged by its (case-insensitive) extension
///
/// # Examples
/// ```
/// use devserve::http::mime::content_type_for;
/// use std::path::Path;
/// assert_eq!(content_type_for(Path::new("index.HTML")), "text/html; charset=utf-8");
/// assert_eq!(content_type_for(Path::new("bundle.wasm")), "application/wasm");
/// assert_eq!(content_type_for(Path::new("LICENSE")), "application/octet-stream");
/// ```
pub fn content_type_for(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(FALLBACK_CONTENT_TYPE, |ext| {
            from_extension(&ext.to_ascii_lowercase())
        })
}

/// Content-Type for a lowercase extension without the leading dot
pub fn from_extension(extension: &str) -> &'static str {
    match extension {
        // Markup and text
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "txt" | "log" => "text/plain; charset=utf-8",
        "md" | "markdown" => "text/markdown; charset=utf-8",
        "csv" => "text/csv; charset=utf-8",
        "xml" => "application/xml",

        // Scripts and data loaded by front-end bundles
        "js" | "mjs" | "cjs" => "text/javascript; charset=utf-8",
        "json" | "map" => "application/json",
        "webmanifest" => "application/manifest+json",
        "wasm" => "application/wasm",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "bmp" => "image/bmp",
        "tga" => "image/x-tga",

        // 3D assets
        "gltf" => "model/gltf+json",
        "glb" => "model/gltf-binary",
        "obj" => "model/obj",
        "fbx" => FALLBACK_CONTENT_TYPE,

        // Video
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "ogv" => "video/ogg",
        "mov" => "video/quicktime",

        // Audio
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" | "oga" => "audio/ogg",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",

        // Archives and documents
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" | "tgz" => "application/gzip",
        "tar" => "application/x-tar",

        _ => FALLBACK_CONTENT_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types() {
        assert_eq!(from_extension("html"), "text/html; charset=utf-8");
        assert_eq!(from_extension("css"), "text/css; charset=utf-8");
        assert_eq!(from_extension("js"), "text/javascript; charset=utf-8");
        assert_eq!(from_extension("json"), "application/json");
        assert_eq!(from_extension("png"), "image/png");
        assert_eq!(from_extension("wasm"), "application/wasm");
    }

    #[test]
    fn test_extension_case_is_ignored() {
        assert_eq!(content_type_for(Path::new("a/B/Logo.PNG")), "image/png");
        assert_eq!(content_type_for(Path::new("main.Js")), "text/javascript; charset=utf-8");
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(from_extension("unitypackage"), FALLBACK_CONTENT_TYPE);
        assert_eq!(content_type_for(Path::new("Makefile")), FALLBACK_CONTENT_TYPE);
        assert_eq!(content_type_for(Path::new(".hidden")), FALLBACK_CONTENT_TYPE);
    }
}

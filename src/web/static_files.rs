//! Static asset serving

use axum::{
    body::Body,
    http::{header, StatusCode, Uri},
    response::Response,
};
use rust_embed::RustEmbed;

/// Embedded site assets (stylesheets, images)
#[derive(RustEmbed)]
#[folder = "static/"]
#[include = "*"]
struct SiteAssets;

/// Serve `/static/*` from the embedded asset set.
pub async fn serve_static(uri: Uri) -> Response {
    let path = uri.path();
    let decoded_path = urlencoding::decode(path).unwrap_or_else(|_| path.into());
    let asset_path = decoded_path
        .trim_start_matches('/')
        .trim_start_matches("static/");

    match SiteAssets::get(asset_path) {
        Some(content) => build_response(asset_path, &content.data),
        None => not_found(),
    }
}

/// Build HTTP response with proper headers
fn build_response(path: &str, data: &[u8]) -> Response {
    let content_type = get_content_type(path);
    let cache_control = if content_type == "text/html; charset=utf-8" {
        "no-cache"
    } else {
        "public, max-age=3600"
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CACHE_CONTROL, cache_control)
        .body(Body::from(data.to_vec()))
        .unwrap_or_else(|_| not_found())
}

/// 404 response
fn not_found() -> Response {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
        .body(Body::from("<html><body><h1>404 Not Found</h1></body></html>"))
        .unwrap_or_default()
}

/// Get content type from file extension
fn get_content_type(path: &str) -> &'static str {
    match path.rsplit('.').next().unwrap_or("") {
        "html" => "text/html; charset=utf-8",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "woff" | "woff2" => "font/woff2",
        "webp" => "image/webp",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_types() {
        assert_eq!(get_content_type("app.css"), "text/css");
        assert_eq!(get_content_type("logo.png"), "image/png");
        assert_eq!(get_content_type("mystery"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_missing_asset_is_404() {
        let response = serve_static("/static/absent.css".parse().unwrap()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_stylesheet_served() {
        let response = serve_static("/static/app.css".parse().unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/css");
    }
}

//! Static host implementation.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::HeaderName, HeaderValue, StatusCode, Uri},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::services::ServeDir;

use crate::headers::{cache_control, security_headers};

/// Configuration for the static host.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Directory containing the exported site
    pub root: PathBuf,

    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("dist"),
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

/// Errors that can occur with the host.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("Invalid address {0}: {1}")]
    InvalidAddress(String, String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),
}

/// Static file responder.
pub struct StaticHost {
    config: HostConfig,
}

impl StaticHost {
    /// Create a new host over an exported site directory.
    pub fn new(config: HostConfig) -> Self {
        Self { config }
    }

    /// Build the router: direct static files first, canonical `{path}.html`
    /// fallback for unmatched routes, headers on everything.
    pub fn router(&self) -> Router {
        let state = Arc::new(self.config.clone());

        let canonical = Router::new()
            .fallback(get(canonical_fallback))
            .with_state(state);

        Router::new()
            .fallback_service(ServeDir::new(&self.config.root).fallback(canonical))
            .layer(middleware::from_fn(with_response_headers))
    }

    /// Start serving.
    pub async fn start(self) -> Result<(), HostError> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| {
                HostError::InvalidAddress(
                    format!("{}:{}", self.config.host, self.config.port),
                    e.to_string(),
                )
            })?;

        let app = self.router();

        tracing::info!("Serving {} at http://{}", self.config.root.display(), addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| HostError::BindError(addr, e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| HostError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

/// Unmatched routes resolve to their pre-rendered page: `/about` is answered
/// by `about.html`, `/` by `index.html`.
async fn canonical_fallback(State(config): State<Arc<HostConfig>>, uri: Uri) -> Response {
    let Some(candidate) = canonical_candidate(uri.path()) else {
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    };

    match tokio::fs::read_to_string(config.root.join(&candidate)).await {
        Ok(html) => Html(html).into_response(),
        Err(_) => {
            tracing::debug!(path = uri.path(), "no canonical page");
            (StatusCode::NOT_FOUND, "Not Found").into_response()
        }
    }
}

/// Map a request path to its canonical HTML file, relative to the site root.
///
/// Returns `None` for paths that try to escape the root.
fn canonical_candidate(path: &str) -> Option<String> {
    let trimmed = path.trim_matches('/');
    if trimmed
        .split('/')
        .any(|part| part == ".." || part.contains('\\'))
    {
        return None;
    }

    if trimmed.is_empty() {
        Some("index.html".to_string())
    } else {
        Some(format!("{trimmed}.html"))
    }
}

/// Stamp every response with the security headers and the cache policy for
/// the requested asset class.
async fn with_response_headers(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    for (name, value) in security_headers() {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    headers.insert(
        HeaderName::from_static("cache-control"),
        HeaderValue::from_static(cache_control(&path)),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::CONTENT_SECURITY_POLICY;
    use axum::body::Body;
    use std::fs;
    use tempfile::tempdir;
    use tower::ServiceExt;

    fn site_host(temp: &tempfile::TempDir) -> StaticHost {
        fs::write(temp.path().join("index.html"), "<h1>Home</h1>").unwrap();
        fs::write(temp.path().join("about.html"), "<h1>About</h1>").unwrap();
        fs::create_dir_all(temp.path().join("assets")).unwrap();
        fs::write(temp.path().join("assets/app.css"), "body {}").unwrap();

        StaticHost::new(HostConfig {
            root: temp.path().to_path_buf(),
            ..HostConfig::default()
        })
    }

    async fn request(router: Router, uri: &str) -> Response {
        router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn extensionless_routes_resolve_to_their_html_page() {
        let temp = tempdir().unwrap();
        let router = site_host(&temp).router();

        let response = request(router, "/about").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"<h1>About</h1>");
    }

    #[tokio::test]
    async fn every_response_carries_the_security_headers() {
        let temp = tempdir().unwrap();
        let host = site_host(&temp);

        for uri in ["/", "/about", "/missing"] {
            let response = request(host.router(), uri).await;
            let headers = response.headers();
            assert_eq!(
                headers.get("content-security-policy").unwrap(),
                CONTENT_SECURITY_POLICY,
                "csp missing on {uri}"
            );
            assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
            assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
        }
    }

    #[tokio::test]
    async fn cache_policy_splits_by_asset_class() {
        let temp = tempdir().unwrap();
        let host = site_host(&temp);

        let asset = request(host.router(), "/assets/app.css").await;
        assert_eq!(asset.status(), StatusCode::OK);
        assert_eq!(
            asset.headers().get("cache-control").unwrap(),
            "public, max-age=31536000, immutable"
        );

        let page = request(host.router(), "/about").await;
        assert_eq!(
            page.headers().get("cache-control").unwrap(),
            "no-cache, must-revalidate"
        );
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let temp = tempdir().unwrap();
        let router = site_host(&temp).router();

        let response = request(router, "/missing").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn creates_host_with_default_config() {
        let host = StaticHost::new(HostConfig::default());
        assert_eq!(host.config.port, 3001);
        assert_eq!(host.config.root, PathBuf::from("dist"));
    }

    #[test]
    fn unmatched_routes_map_to_canonical_pages() {
        assert_eq!(canonical_candidate("/about"), Some("about.html".to_string()));
        assert_eq!(
            canonical_candidate("/quick-start/"),
            Some("quick-start.html".to_string())
        );
        assert_eq!(canonical_candidate("/"), Some("index.html".to_string()));
    }

    #[test]
    fn traversal_paths_are_rejected() {
        assert_eq!(canonical_candidate("/../etc/passwd"), None);
        assert_eq!(canonical_candidate("/a/../../b"), None);
        assert_eq!(canonical_candidate("/a\\b"), None);
    }

    #[test]
    fn router_builds_over_missing_directory() {
        // The router itself must not panic when the root does not exist yet;
        // requests simply 404.
        let host = StaticHost::new(HostConfig {
            root: PathBuf::from("does-not-exist"),
            ..HostConfig::default()
        });
        let _router = host.router();
    }
}

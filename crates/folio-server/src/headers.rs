//! Response headers: security policy and cache-control by asset class.

/// Content security policy sent with every response.
///
/// Scripts and styles come only from the site itself; nothing may frame it.
pub const CONTENT_SECURITY_POLICY: &str = "default-src 'none'; \
script-src 'self'; \
connect-src 'self'; \
child-src 'self'; \
img-src 'self'; \
style-src 'self'; \
object-src 'none'; \
frame-ancestors 'none'; \
base-uri 'self'; \
form-action 'self'";

/// The standard security headers added to every response.
pub fn security_headers() -> [(&'static str, &'static str); 6] {
    [
        ("content-security-policy", CONTENT_SECURITY_POLICY),
        (
            "strict-transport-security",
            "max-age=31536000; includeSubdomains; preload",
        ),
        ("x-frame-options", "DENY"),
        ("x-xss-protection", "1; mode=block"),
        ("x-content-type-options", "nosniff"),
        ("referrer-policy", "same-origin"),
    ]
}

/// Cache policy for a request path.
///
/// Fingerprinted static assets never change between builds and may be cached
/// forever; HTML (and the compiled-unit artifacts it references) must always
/// revalidate so a new deployment takes effect immediately.
pub fn cache_control(path: &str) -> &'static str {
    if path.starts_with("/assets/") {
        "public, max-age=31536000, immutable"
    } else {
        "no-cache, must-revalidate"
    }
}

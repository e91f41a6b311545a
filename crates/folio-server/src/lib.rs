//! Static file responder for exported sites.
//!
//! A thin host over a build's output directory: serves pre-rendered HTML and
//! assets, falls back to the canonical `{path}.html` for unmatched routes, and
//! stamps every response with security headers and an asset-class cache
//! policy.

pub mod headers;
pub mod server;

pub use server::{HostConfig, HostError, StaticHost};

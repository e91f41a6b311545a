//! Configuration file (folio.toml) handling.

use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

/// Configuration file structure (folio.toml).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub site: SiteSettings,
    #[serde(default)]
    pub serve: ServeSettings,
}

#[derive(Debug, Deserialize)]
pub struct SiteSettings {
    /// Directory of MDX documents
    #[serde(default = "default_posts_dir")]
    pub posts: String,

    /// Export output directory
    #[serde(default = "default_output")]
    pub output: String,

    /// Site title
    #[serde(default = "default_title")]
    pub title: String,

    /// Document identifier that doubles as the site index
    #[serde(default = "default_home")]
    pub home: String,
}

#[derive(Debug, Deserialize)]
pub struct ServeSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            posts: default_posts_dir(),
            output: default_output(),
            title: default_title(),
            home: default_home(),
        }
    }
}

impl Default for ServeSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_posts_dir() -> String {
    "posts".to_string()
}
fn default_output() -> String {
    "dist".to_string()
}
fn default_title() -> String {
    "Documentation".to_string()
}
fn default_home() -> String {
    "home".to_string()
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    3001
}

/// Load configuration from the given path if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load(path: &Path) -> Result<ConfigFile> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let config: ConfigFile = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
        tracing::info!("Loaded config from {}", path.display());
        return Ok(config);
    }
    Ok(ConfigFile::default())
}

//! Static host command.

use std::path::PathBuf;

use anyhow::Result;
use folio_server::{HostConfig, StaticHost};

use crate::config::ConfigFile;

/// Run the serve command.
pub async fn run(
    config: &ConfigFile,
    port: Option<u16>,
    dir: Option<PathBuf>,
    open_browser: bool,
) -> Result<()> {
    let root = dir.unwrap_or_else(|| PathBuf::from(&config.site.output));
    if !root.exists() {
        anyhow::bail!(
            "Directory not found: {}. Run 'folio build' first.",
            root.display()
        );
    }

    let host_config = HostConfig {
        root,
        host: config.serve.host.clone(),
        port: port.unwrap_or(config.serve.port),
    };

    if open_browser {
        let url = format!("http://{}:{}", host_config.host, host_config.port);
        let _ = open::that(&url);
    }

    StaticHost::new(host_config).start().await?;

    Ok(())
}

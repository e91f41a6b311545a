//! Site export command.

use std::path::PathBuf;

use anyhow::Result;
use folio_static::{ExportBuilder, ExportConfig};

use crate::config::ConfigFile;

/// Run the build command.
pub async fn run(config: &ConfigFile, output: Option<PathBuf>) -> Result<()> {
    tracing::info!("Exporting site...");

    let export_config = ExportConfig {
        posts_dir: PathBuf::from(&config.site.posts),
        output_dir: output.unwrap_or_else(|| PathBuf::from(&config.site.output)),
        site_title: config.site.title.clone(),
        home_id: config.site.home.clone(),
    };

    let result = ExportBuilder::new(export_config).build().await?;

    tracing::info!(
        "Exported {} pages in {}ms",
        result.pages,
        result.duration_ms
    );
    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}

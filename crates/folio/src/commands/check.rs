//! Document check command: compile and evaluate everything, write nothing.

use std::path::Path;

use anyhow::Result;
use walkdir::WalkDir;

use folio_runtime::{evaluate, Capabilities, DocumentCompiler, FileCompiler};

use crate::config::ConfigFile;

/// Run the check command.
///
/// Every document must compile and evaluate against the standard capability
/// table; this catches malformed frontmatter, unbalanced tags, and references
/// to capabilities the site does not expose, before anything is deployed.
pub async fn run(config: &ConfigFile) -> Result<()> {
    let posts_dir = Path::new(&config.site.posts);
    if !posts_dir.exists() {
        anyhow::bail!("Posts directory not found: {}", posts_dir.display());
    }

    let compiler = FileCompiler::new(posts_dir);
    let capabilities = Capabilities::standard();

    let mut checked = 0usize;
    let mut failures = 0usize;

    for entry in WalkDir::new(posts_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("mdx") {
            continue;
        }
        let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        checked += 1;
        match compiler.compile(id).await {
            Ok(unit) => {
                if let Err(e) = evaluate(&unit, &capabilities).await {
                    tracing::error!(id, error = %e, "evaluation failed");
                    failures += 1;
                }
            }
            Err(e) => {
                tracing::error!(id, error = %e, "compilation failed");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {checked} documents failed");
    }

    tracing::info!("All {} documents check out", checked);
    Ok(())
}

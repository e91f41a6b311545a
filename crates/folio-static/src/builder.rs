//! Ahead-of-time export builder.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use rayon::prelude::*;
use walkdir::WalkDir;

use folio_mdx::{compile_source, CompiledUnit};

use crate::assets::AssetPipeline;
use crate::templates::{NavItem, PageContext, TemplateEngine};

/// Configuration for an export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Directory of `{id}.mdx` documents
    pub posts_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Site title rendered into every shell
    pub site_title: String,

    /// Identifier of the document that doubles as the site index
    pub home_id: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            posts_dir: PathBuf::from("posts"),
            output_dir: PathBuf::from("dist"),
            site_title: "Documentation".to_string(),
            home_id: "home".to_string(),
        }
    }
}

/// Result of an export.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of documents exported
    pub pages: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during an export.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read posts directory: {0}")]
    ReadError(String),

    #[error("Failed to compile {id}: {message}")]
    CompileError { id: String, message: String },

    #[error("Failed to render shell: {0}")]
    TemplateError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

/// One document scheduled for export.
#[derive(Debug)]
struct PageInfo {
    id: String,
    unit: CompiledUnit,
}

/// Ahead-of-time export builder.
pub struct ExportBuilder {
    config: ExportConfig,
    templates: TemplateEngine,
}

impl ExportBuilder {
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            templates: TemplateEngine::new(),
        }
    }

    /// Run the export.
    pub async fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        for dir in ["", "units", "assets"] {
            fs::create_dir_all(self.config.output_dir.join(dir))
                .map_err(|e| BuildError::WriteError(e.to_string()))?;
        }

        let pages = self.compile_pages()?;
        let nav = self.build_navigation(&pages);

        pages
            .par_iter()
            .try_for_each(|page| self.write_page(page, &nav))?;

        fs::write(
            self.config.output_dir.join("assets/app.css"),
            AssetPipeline::default_stylesheet(),
        )
        .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let duration = start.elapsed();
        tracing::info!(pages = pages.len(), "export finished");

        Ok(BuildResult {
            pages: pages.len(),
            duration_ms: duration.as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    /// Compile every document in the posts directory, once per build.
    fn compile_pages(&self) -> Result<Vec<PageInfo>, BuildError> {
        if !self.config.posts_dir.exists() {
            return Err(BuildError::ReadError(format!(
                "Posts directory not found: {}",
                self.config.posts_dir.display()
            )));
        }

        let mut sources = Vec::new();
        for entry in WalkDir::new(&self.config.posts_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if ext != "mdx" && ext != "md" {
                continue;
            }

            let id = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("index")
                .to_string();
            let source = fs::read_to_string(path)
                .map_err(|e| BuildError::ReadError(format!("{}: {}", path.display(), e)))?;
            sources.push((id, source));
        }

        let mut pages = sources
            .par_iter()
            .map(|(id, source)| {
                let unit = compile_source(id, source).map_err(|e| BuildError::CompileError {
                    id: id.clone(),
                    message: e.to_string(),
                })?;
                Ok(PageInfo {
                    id: id.clone(),
                    unit,
                })
            })
            .collect::<Result<Vec<_>, BuildError>>()?;

        // Sort by frontmatter order, unordered documents last.
        pages.sort_by_key(|p| {
            p.unit
                .frontmatter
                .as_ref()
                .and_then(|f| f.order)
                .unwrap_or(i32::MAX)
        });

        Ok(pages)
    }

    /// Build the navigation list from frontmatter.
    fn build_navigation(&self, pages: &[PageInfo]) -> Vec<NavItem> {
        pages
            .iter()
            .filter(|p| p.unit.frontmatter.as_ref().map_or(true, |f| f.nav))
            .map(|p| {
                let title = p
                    .unit
                    .frontmatter
                    .as_ref()
                    .map(|f| f.title.clone())
                    .unwrap_or_else(|| p.id.clone());
                NavItem {
                    title,
                    path: self.page_path(&p.id),
                }
            })
            .collect()
    }

    fn page_path(&self, id: &str) -> String {
        if id == self.config.home_id {
            "/".to_string()
        } else {
            format!("/{id}")
        }
    }

    /// Write one document's artifacts: the compiled unit and its HTML shell.
    fn write_page(&self, page: &PageInfo, nav: &[NavItem]) -> Result<(), BuildError> {
        let unit_json = serde_json::to_string_pretty(&page.unit)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;
        fs::write(
            self.config.output_dir.join(format!("units/{}.json", page.id)),
            &unit_json,
        )
        .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let fm = page.unit.frontmatter.as_ref();
        let ctx = PageContext {
            id: page.id.clone(),
            title: fm.map(|f| f.title.clone()).unwrap_or_else(|| page.id.clone()),
            site_title: self.config.site_title.clone(),
            description: fm.and_then(|f| f.description.clone()),
            unit_path: format!("/units/{}.json", page.id),
            nav: nav.to_vec(),
        };

        let html = self
            .templates
            .render_shell(&ctx)
            .map_err(|e| BuildError::TemplateError(e.to_string()))?;

        fs::write(
            self.config.output_dir.join(format!("{}.html", page.id)),
            &html,
        )
        .map_err(|e| BuildError::WriteError(e.to_string()))?;

        // The home document doubles as the site index.
        if page.id == self.config.home_id {
            fs::write(self.config.output_dir.join("index.html"), &html)
                .map_err(|e| BuildError::WriteError(e.to_string()))?;
        }

        tracing::debug!(id = %page.id, "exported");
        Ok(())
    }
}

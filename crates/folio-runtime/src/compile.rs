//! The asynchronous document-compiler boundary.

use std::future::Future;
use std::path::PathBuf;

use folio_mdx::{compile_source, CompiledUnit};

/// Errors surfaced by the compiler boundary.
///
/// Both variants are caught at the lifecycle controller; neither may crash the
/// application shell.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("No document found for identifier '{0}'")]
    NotFound(String),

    #[error("Failed to compile '{id}': {message}")]
    Compile { id: String, message: String },
}

/// Produces the compiled unit for a document identifier.
///
/// Deterministic given identical source text. Implementations decide where the
/// source lives; the controller only sees this contract.
pub trait DocumentCompiler: Send + Sync {
    fn compile(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<CompiledUnit, DocumentError>> + Send;
}

/// Compiles documents from a directory of `{id}.mdx` files.
#[derive(Debug, Clone)]
pub struct FileCompiler {
    posts_dir: PathBuf,
}

impl FileCompiler {
    pub fn new(posts_dir: impl Into<PathBuf>) -> Self {
        Self {
            posts_dir: posts_dir.into(),
        }
    }
}

impl DocumentCompiler for FileCompiler {
    async fn compile(&self, id: &str) -> Result<CompiledUnit, DocumentError> {
        // Identifiers are flat names; anything path-like has no document.
        if id.is_empty() || id.contains(['/', '\\']) || id.contains("..") {
            return Err(DocumentError::NotFound(id.to_string()));
        }

        let path = self.posts_dir.join(format!("{id}.mdx"));
        let source = match tokio::fs::read_to_string(&path).await {
            Ok(source) => source,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DocumentError::NotFound(id.to_string()));
            }
            Err(e) => {
                return Err(DocumentError::Compile {
                    id: id.to_string(),
                    message: e.to_string(),
                });
            }
        };

        compile_source(id, &source).map_err(|e| DocumentError::Compile {
            id: id.to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn compiles_existing_document() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("home.mdx"),
            "---\ntitle: Home\n---\n\n# Welcome\n",
        )
        .unwrap();

        let compiler = FileCompiler::new(temp.path());
        let unit = compiler.compile("home").await.unwrap();

        assert_eq!(unit.id, "home");
        assert_eq!(unit.frontmatter.unwrap().title, "Home");
    }

    #[tokio::test]
    async fn missing_document_is_not_found() {
        let temp = tempdir().unwrap();

        let compiler = FileCompiler::new(temp.path());
        let result = compiler.compile("missing").await;

        assert!(matches!(result, Err(DocumentError::NotFound(id)) if id == "missing"));
    }

    #[tokio::test]
    async fn path_like_identifiers_are_rejected() {
        let temp = tempdir().unwrap();

        let compiler = FileCompiler::new(temp.path());

        for id in ["../secret", "a/b", "", "..\\other"] {
            let result = compiler.compile(id).await;
            assert!(
                matches!(result, Err(DocumentError::NotFound(_))),
                "expected NotFound for {id:?}"
            );
        }
    }

    #[tokio::test]
    async fn malformed_source_is_a_compile_error() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("broken.mdx"),
            "---\ntitle: [oops\n---\n\nbody\n",
        )
        .unwrap();

        let compiler = FileCompiler::new(temp.path());
        let result = compiler.compile("broken").await;

        assert!(matches!(result, Err(DocumentError::Compile { .. })));
    }
}

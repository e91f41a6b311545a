//! Static assets written into every export.

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// The default stylesheet.
    pub fn default_stylesheet() -> String {
        DEFAULT_CSS.to_string()
    }
}

const DEFAULT_CSS: &str = r#"/* folio default theme */

:root {
  --content-max-width: 800px;
  --muted: #f5f5f5;
  --border: #e0e0e0;
  --accent: #0a66c2;
}

* {
  box-sizing: border-box;
  margin: 0;
  padding: 0;
}

body {
  font-family: system-ui, -apple-system, sans-serif;
  line-height: 1.6;
  color: #1a1a1a;
}

.container {
  max-width: var(--content-max-width);
  margin: 2rem auto;
  padding: 0 1rem;
}

header h2 a {
  color: inherit;
  text-decoration: none;
}

.article {
  margin-top: 1.5rem;
}

.article a {
  color: var(--accent);
}

pre {
  position: relative;
  background: var(--muted);
  padding: 1rem;
  border-radius: 0.5rem;
  overflow-x: auto;
}

pre code {
  font-family: ui-monospace, monospace;
  font-size: 0.9rem;
}

.copy-button {
  position: absolute;
  top: 0.5rem;
  right: 0.5rem;
  padding: 0.25rem 0.75rem;
  border: 1px solid var(--border);
  border-radius: 0.25rem;
  background: #fff;
  cursor: pointer;
}

.copy-button:disabled {
  cursor: default;
  opacity: 0.7;
}

.navbar {
  margin-top: 2rem;
  padding-top: 1rem;
  border-top: 1px solid var(--border);
}

.navbar ul {
  list-style: none;
}

.navbar a {
  color: var(--accent);
  text-decoration: none;
}
"#;

//! HTML shell templates for exported documents.

use minijinja::{context, Environment};

/// A navigation entry rendered into every shell.
#[derive(Debug, Clone, serde::Serialize)]
pub struct NavItem {
    /// Display title
    pub title: String,
    /// URL path
    pub path: String,
}

/// Context for rendering one document shell.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PageContext {
    /// Document identifier
    pub id: String,
    /// Page title
    pub title: String,
    /// Site title
    pub site_title: String,
    /// Description for the meta tag
    pub description: Option<String>,
    /// Path of the compiled-unit artifact the client loads
    pub unit_path: String,
    /// Navigation items
    pub nav: Vec<NavItem>,
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with the built-in shell template.
    pub fn new() -> Self {
        let mut env = Environment::new();

        env.add_template_owned("shell.html".to_string(), SHELL_TEMPLATE.to_string())
            .expect("Failed to add shell template");

        Self { env }
    }

    /// Render the HTML shell for one document.
    pub fn render_shell(&self, ctx: &PageContext) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("shell.html")?;

        tmpl.render(context! {
            id => &ctx.id,
            title => &ctx.title,
            site_title => &ctx.site_title,
            description => &ctx.description,
            unit_path => &ctx.unit_path,
            nav => &ctx.nav,
        })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

const SHELL_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <meta name="description" content="{{ description or site_title }}">
  <title>{{ title }} - {{ site_title }}</title>
  <link rel="stylesheet" href="/assets/app.css">
  <link rel="icon" href="/favicon.ico">
</head>
<body>
  <div class="container">
    <header>
      <h2><a href="/">{{ site_title }}</a></h2>
    </header>
    <main>
      <article class="article" id="root" data-document="{{ id }}" data-unit="{{ unit_path | safe }}">
      </article>
      <div class="navbar">
        <div class="navbar-header"><h3>Links</h3></div>
        <ul>
        {% for item in nav %}
          <li><a href="{{ item.path | safe }}">{{ item.title }}</a></li>
        {% endfor %}
        </ul>
      </div>
    </main>
  </div>
</body>
</html>
"##;

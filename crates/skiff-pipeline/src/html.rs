//! Entry document generation.
//!
//! Renders the index.html that loads the compiled bundle, carrying the
//! hashed asset URLs produced by the pipeline.

use minijinja::Environment;

/// Context for rendering the entry document.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct IndexContext {
    /// Document title
    pub title: String,

    /// URL of the compiled entry bundle
    pub script_src: String,

    /// URL of the extracted stylesheet (production builds)
    pub style_href: Option<String>,

    /// Inlined stylesheet contents (development builds)
    pub inline_css: Option<String>,

    /// Whether the production flag define is emitted
    pub production: bool,

    /// Auth bootstrap script to embed, if auth is configured
    pub auth_bootstrap: Option<String>,

    /// Whether the live-reload client tag is emitted
    pub live_reload: bool,
}

/// Template engine for the entry document.
pub struct IndexTemplate {
    env: Environment<'static>,
}

impl IndexTemplate {
    /// Create a new template engine with the default template.
    pub fn new() -> Self {
        let mut env = Environment::new();

        env.add_template_owned("index.html".to_string(), INDEX_TEMPLATE.to_string())
            .expect("Failed to add index template");

        Self { env }
    }

    /// Render the entry document.
    pub fn render(&self, ctx: &IndexContext) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("index.html")?;

        tmpl.render(ctx)
    }
}

impl Default for IndexTemplate {
    fn default() -> Self {
        Self::new()
    }
}

const INDEX_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ title }}</title>
  {% if style_href %}<link rel="stylesheet" href="{{ style_href }}">
  {% endif %}{% if inline_css %}<style>{{ inline_css | safe }}</style>
  {% endif %}</head>
<body>
  <div id="app"></div>
  {% if production %}<script>window.__SKIFF_ENV__ = "production";</script>
  {% endif %}<script src="{{ script_src }}"></script>
  {% if auth_bootstrap %}<script>{{ auth_bootstrap | safe }}</script>
  {% endif %}{% if live_reload %}<script src="/__reload.js"></script>
  {% endif %}</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;

    fn base_ctx() -> IndexContext {
        IndexContext {
            title: "App".to_string(),
            script_src: "/js/app.0a1b2c3d.js".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn renders_script_tag() {
        let html = IndexTemplate::new().render(&base_ctx()).unwrap();

        assert!(html.contains(r#"<script src="/js/app.0a1b2c3d.js"></script>"#));
        assert!(html.contains("<title>App</title>"));
    }

    #[test]
    fn production_build_links_stylesheet_and_defines_flag() {
        let ctx = IndexContext {
            style_href: Some("/css/app.11223344.css".to_string()),
            production: true,
            ..base_ctx()
        };
        let html = IndexTemplate::new().render(&ctx).unwrap();

        assert!(html.contains(r#"<link rel="stylesheet" href="/css/app.11223344.css">"#));
        assert!(html.contains(r#"window.__SKIFF_ENV__ = "production";"#));
        assert!(!html.contains("__reload.js"));
    }

    #[test]
    fn development_build_inlines_styles_and_reload_client() {
        let ctx = IndexContext {
            inline_css: Some("body{margin:0}".to_string()),
            live_reload: true,
            ..base_ctx()
        };
        let html = IndexTemplate::new().render(&ctx).unwrap();

        assert!(html.contains("<style>body{margin:0}</style>"));
        assert!(html.contains(r#"<script src="/__reload.js"></script>"#));
        assert!(!html.contains("<link rel=\"stylesheet\""));
    }

    #[test]
    fn embeds_auth_bootstrap_unescaped() {
        let ctx = IndexContext {
            auth_bootstrap: Some("var x = 'a' && 'b';".to_string()),
            ..base_ctx()
        };
        let html = IndexTemplate::new().render(&ctx).unwrap();

        assert!(html.contains("var x = 'a' && 'b';"));
    }

    #[test]
    fn escapes_title() {
        let ctx = IndexContext {
            title: "A <b> title".to_string(),
            ..base_ctx()
        };
        let html = IndexTemplate::new().render(&ctx).unwrap();

        assert!(html.contains("A &lt;b&gt; title"));
    }
}

//! Built-in layout templates using the Tera template engine
//!
//! The layout shell, home page and post page are embedded in the binary.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::helpers;

/// Template renderer with the embedded site layout
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Rendered post bodies and URLs go out verbatim; text fields use `| escape`
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("home.html", include_str!("site/home.html")),
            ("post.html", include_str!("site/post.html")),
        ])?;

        tera.register_filter("display_date", display_date_filter);
        tera.register_filter("post_title", post_title_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: format an ISO date as "January 1, 2024"
fn display_date_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("display_date", "value", String, value);
    Ok(tera::Value::String(helpers::display_date(&s)))
}

/// Tera filter: a post's title when it is a string, otherwise its id
fn post_title_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let title = value
        .get("title")
        .and_then(tera::Value::as_str)
        .or_else(|| value.get("id").and_then(tera::Value::as_str))
        .unwrap_or_default();
    Ok(tera::Value::String(title.to_string()))
}

/// Site-wide values shared by every page
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub name: String,
    pub description: String,
    pub language: String,
    pub avatar: String,
    pub favicon: String,
    pub stylesheet: String,
    pub og_image: String,
    pub intro: Vec<String>,
}

impl SiteData {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            name: config.name.clone(),
            description: config.description.clone(),
            language: config.language.clone(),
            avatar: config.avatar.clone(),
            favicon: config.favicon.clone(),
            stylesheet: config.stylesheet.clone(),
            og_image: helpers::og_image_url(config),
            intro: config.intro.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context(is_home: bool) -> Context {
        let mut config = SiteConfig::default();
        config.title = "Kaven Kim | Product Manager".to_string();
        config.name = "Kav".to_string();
        config.intro = vec!["Hello! I'm Kaven!".to_string()];

        let mut context = Context::new();
        context.insert("site", &SiteData::from_config(&config));
        context.insert("is_home", &is_home);
        context.insert("canonical", "http://localhost:3000/");
        context.insert("route_prefix", "/posts");
        context
    }

    #[test]
    fn test_home_layout() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = context(true);
        context.insert(
            "posts",
            &json!([
                { "id": "newer", "title": "Newer Post", "date": "2024-06-01" },
                { "id": "untitled" },
            ]),
        );

        let html = renderer.render("home.html", &context).unwrap();
        assert!(html.contains("<title>Kaven Kim | Product Manager</title>"));
        assert!(html.contains(r#"height="144""#));
        assert!(html.contains(r#"<h1 class="site-heading-2xl">Kav</h1>"#));
        assert!(html.contains("<p>Hello! I&#x27;m Kaven!</p>"));
        assert!(html.contains("Kaven%20Kim%20%7C%20Product%20Manager.png"));
        assert!(html.contains(">Newer Post</a>"));
        assert!(html.contains("June 1, 2024"));
        assert!(html.contains(">untitled</a>"));
        assert!(!html.contains("Back to home"));
    }

    #[test]
    fn test_home_without_posts_has_no_blog_section() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = context(true);
        context.insert("posts", &json!([]));

        let html = renderer.render("home.html", &context).unwrap();
        assert!(!html.contains("Blog"));
    }

    #[test]
    fn test_post_layout() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = context(false);
        context.insert(
            "post",
            &json!({ "id": "hello", "title": "Hello <World>", "date": "2024-01-01", "body": "" }),
        );
        context.insert("html", "<p>Rendered <em>body</em></p>");

        let html = renderer.render("post.html", &context).unwrap();
        assert!(html.contains("<title>Hello &lt;World&gt;</title>"));
        assert!(html.contains("<p>Rendered <em>body</em></p>"));
        assert!(html.contains("January 1, 2024"));
        assert!(html.contains(r#"height="108""#));
        assert!(html.contains("← Back to home"));
    }

    #[test]
    fn test_structured_title_and_date_fall_back() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = context(true);
        context.insert(
            "posts",
            &json!([{ "id": "a&b", "title": ["x", "y"], "date": { "year": 2024 } }]),
        );

        let html = renderer.render("home.html", &context).unwrap();
        assert!(html.contains(r#"href="/posts/a%26b">a&amp;b</a>"#));
        assert!(!html.contains("<time"));
    }
}

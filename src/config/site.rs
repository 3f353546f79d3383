//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub name: String,
    pub description: String,
    pub language: String,
    pub url: String,

    // Layout
    pub avatar: String,
    pub favicon: String,
    pub stylesheet: String,
    pub intro: Vec<String>,
    pub og_image: OgImageConfig,

    // Directory
    pub content_dir: String,
    pub static_dir: String,
    pub output_dir: String,

    // Writing
    pub markdown: MarkdownConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "My Site".to_string(),
            name: "Me".to_string(),
            description: String::new(),
            language: "en".to_string(),
            url: "http://localhost:3000".to_string(),

            avatar: "/images/profile.jpg".to_string(),
            favicon: "/favicon.ico".to_string(),
            stylesheet: "/styles/global.css".to_string(),
            intro: Vec::new(),
            og_image: OgImageConfig::default(),

            content_dir: "posts".to_string(),
            static_dir: "public".to_string(),
            output_dir: "out".to_string(),

            markdown: MarkdownConfig::default(),

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let config: SiteConfig =
            serde_yaml::from_str(&content).with_context(|| format!("Invalid config {:?}", path))?;
        Ok(config)
    }
}

/// Social preview image, rendered by an external service from the site title
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OgImageConfig {
    pub base: String,
    pub query: String,
}

impl Default for OgImageConfig {
    fn default() -> Self {
        Self {
            base: "https://og-image.vercel.app".to_string(),
            query: "theme=light&md=0&fontSize=75px&images=https%3A%2F%2Fassets.zeit.co%2Fimage%2Fupload%2Ffront%2Fassets%2Fdesign%2Fnextjs-black-logo.svg".to_string(),
        }
    }
}

/// Markdown rendering options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Highlight fenced code blocks with syntect
    pub highlight: bool,
    pub highlight_theme: String,
    /// Inline styles per element (h1, h2, p, code, pre)
    pub styles: IndexMap<String, String>,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        let styles = [
            ("h1", "font-size: 2rem; font-weight: bold"),
            ("h2", "font-size: 1.5rem; font-weight: bold"),
            ("p", "margin-bottom: 1rem; line-height: 1.6"),
            (
                "code",
                "background-color: #f4f4f4; padding: 0.2rem 0.4rem; border-radius: 0.25rem; font-family: monospace",
            ),
            (
                "pre",
                "background-color: #f4f4f4; padding: 1rem; border-radius: 0.5rem; overflow: auto; margin-bottom: 1rem",
            ),
        ];

        Self {
            highlight: true,
            highlight_theme: "InspiredGitHub".to_string(),
            styles: styles
                .into_iter()
                .map(|(tag, style)| (tag.to_string(), style.to_string()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "My Site");
        assert_eq!(config.content_dir, "posts");
        assert_eq!(config.output_dir, "out");
        assert!(config.markdown.highlight);
        assert_eq!(config.markdown.styles.len(), 5);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: Kaven Kim | Product Manager
name: Kav
intro:
  - Hello!
  - Second paragraph.
content_dir: articles
markdown:
  highlight: false
github: kav
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "Kaven Kim | Product Manager");
        assert_eq!(config.name, "Kav");
        assert_eq!(config.intro, vec!["Hello!", "Second paragraph."]);
        assert_eq!(config.content_dir, "articles");
        assert!(!config.markdown.highlight);
        // Unset nested fields keep their defaults
        assert_eq!(config.markdown.highlight_theme, "InspiredGitHub");
        assert_eq!(config.static_dir, "public");
        assert_eq!(
            config.extra.get("github").and_then(|v| v.as_str()),
            Some("kav")
        );
    }
}

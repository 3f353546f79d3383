//! Markdown rendering with syntax highlighting and per-element styles

use anyhow::Result;
use indexmap::IndexMap;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{start_highlighted_html_snippet, styled_line_to_highlighted_html, IncludeBackground};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::config::MarkdownConfig;

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    highlight: bool,
    styles: IndexMap<String, String>,
}

impl MarkdownRenderer {
    /// Create a renderer with the default options
    pub fn new() -> Self {
        Self::from_config(&MarkdownConfig::default())
    }

    /// Create a renderer from site configuration
    pub fn from_config(config: &MarkdownConfig) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: config.highlight_theme.clone(),
            highlight: config.highlight,
            styles: config.styles.clone(),
        }
    }

    /// Render a markdown/MDX body to HTML.
    ///
    /// Raw HTML and component tags are passed through as-is.
    pub fn render(&self, markdown: &str) -> Result<String> {
        // Front-matter is stripped before this point, so no metadata blocks here
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut code_block: Option<(Option<String>, String)> = None;

        for event in parser {
            if let Some((lang, code)) = code_block.as_mut() {
                match event {
                    Event::Text(text) => code.push_str(&text),
                    Event::End(TagEnd::CodeBlock) => {
                        let block = self.code_block(code, lang.as_deref());
                        events.push(Event::Html(CowStr::from(block)));
                        code_block = None;
                    }
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .map(str::to_string),
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::Start(Tag::Heading {
                    level,
                    id,
                    classes,
                    attrs,
                }) => match self.style_for(heading_tag(level)) {
                    Some(style) => {
                        let mut open = format!("<{}", heading_tag(level));
                        if let Some(id) = id {
                            open.push_str(&format!(r#" id="{}""#, html_escape(&id)));
                        }
                        if !classes.is_empty() {
                            let classes: Vec<&str> = classes.iter().map(|c| c.as_ref()).collect();
                            open.push_str(&format!(r#" class="{}""#, html_escape(&classes.join(" "))));
                        }
                        open.push_str(&format!(r#" style="{}">"#, html_escape(style)));
                        events.push(Event::Html(CowStr::from(open)));
                    }
                    None => events.push(Event::Start(Tag::Heading {
                        level,
                        id,
                        classes,
                        attrs,
                    })),
                },
                Event::End(TagEnd::Heading(level)) if self.style_for(heading_tag(level)).is_some() => {
                    events.push(Event::Html(CowStr::from(format!(
                        "</{}>\n",
                        heading_tag(level)
                    ))));
                }
                Event::Start(Tag::Paragraph) if self.style_for("p").is_some() => {
                    let style = self.style_for("p").unwrap_or_default();
                    events.push(Event::Html(CowStr::from(format!(
                        r#"<p style="{}">"#,
                        html_escape(style)
                    ))));
                }
                Event::End(TagEnd::Paragraph) if self.style_for("p").is_some() => {
                    events.push(Event::Html(CowStr::from("</p>\n")));
                }
                Event::Code(code) => match self.style_for("code") {
                    Some(style) => events.push(Event::InlineHtml(CowStr::from(format!(
                        r#"<code style="{}">{}</code>"#,
                        html_escape(style),
                        html_escape(&code)
                    )))),
                    None => events.push(Event::Code(code)),
                },
                other => events.push(other),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(html_output)
    }

    fn style_for(&self, tag: &str) -> Option<&str> {
        self.styles
            .get(tag)
            .map(String::as_str)
            .filter(|style| !style.trim().is_empty())
    }

    /// Render a fenced or indented code block
    fn code_block(&self, code: &str, lang: Option<&str>) -> String {
        if self.highlight {
            if let Some(highlighted) = self.highlight_code(code, lang) {
                return highlighted;
            }
        }

        let class = lang
            .map(|l| format!(r#" class="language-{}""#, html_escape(l)))
            .unwrap_or_default();
        let style = self
            .style_for("pre")
            .map(|s| format!(r#" style="{}""#, html_escape(s)))
            .unwrap_or_default();
        format!(
            "<pre{}><code{}>{}</code></pre>\n",
            style,
            class,
            html_escape(code)
        )
    }

    /// Highlight code with syntect; `None` when the theme is unknown or highlighting fails
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> Option<String> {
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self.theme()?;

        // A configured `pre` style replaces the theme background
        let open = match self.style_for("pre") {
            Some(style) => format!(r#"<pre style="{}">"#, html_escape(style)),
            None => start_highlighted_html_snippet(theme).0,
        };

        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut html = open;
        html.push_str("<code>");
        for line in LinesWithEndings::from(code) {
            let highlighted = highlighter
                .highlight_line(line, &self.syntax_set)
                .and_then(|regions| styled_line_to_highlighted_html(&regions, IncludeBackground::No));
            match highlighted {
                Ok(line_html) => html.push_str(&line_html),
                Err(e) => {
                    tracing::warn!("Failed to highlight {} code block: {}", lang, e);
                    return None;
                }
            }
        }
        html.push_str("</code></pre>\n");

        Some(html)
    }

    fn theme(&self) -> Option<&Theme> {
        let theme = self.theme_set.themes.get(&self.theme_name);
        if theme.is_none() {
            tracing::warn!("Unknown highlight theme {:?}", self.theme_name);
        }
        theme
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn heading_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

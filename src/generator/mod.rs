//! Generator module - writes the static site using the built-in Tera templates

use anyhow::{Context as _, Result};
use std::fs;
use std::path::{Path, PathBuf};

use tera::Context;
use walkdir::WalkDir;

use crate::content::{ContentStore, MarkdownRenderer, PostMetadata, ROUTE_PREFIX};
use crate::helpers::full_url_for;
use crate::routes::{PageBinder, PostPage};
use crate::templates::{SiteData, TemplateRenderer};
use crate::Site;

/// Machine-readable copy of the post index
const INDEX_JSON: &str = "posts.json";

/// What a build produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub posts: usize,
    pub assets: usize,
}

/// Static site generator
pub struct Generator {
    site: Site,
    store: ContentStore,
    markdown: MarkdownRenderer,
    renderer: TemplateRenderer,
    site_data: SiteData,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &Site) -> Result<Self> {
        Ok(Self {
            site: site.clone(),
            store: ContentStore::new(&site.content_dir),
            markdown: MarkdownRenderer::from_config(&site.config.markdown),
            renderer: TemplateRenderer::new()?,
            site_data: SiteData::from_config(&site.config),
        })
    }

    /// Page binder over this site's content
    pub fn binder(&self) -> PageBinder<'_> {
        PageBinder::new(&self.store, &self.markdown)
    }

    /// Generate the entire site
    pub fn generate(&self) -> Result<BuildSummary> {
        let output_dir = &self.site.output_dir;
        fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create {:?}", output_dir))?;

        let assets = self.copy_static_assets()?;

        let binder = self.binder();
        let index = binder.index_props()?;

        let home = self.render_home_with(&index)?;
        self.write_page(Path::new("index.html"), &home)?;

        let routes = binder.static_paths()?;
        for route in &routes {
            let page = binder.static_props(&route.id)?;
            let html = self.render_post_page(&page)?;
            let relative = Path::new(route.path().trim_start_matches('/')).join("index.html");
            self.write_page(&relative, &html)?;
        }

        let json = serde_json::to_string_pretty(&index)?;
        fs::write(output_dir.join(INDEX_JSON), json)?;
        tracing::debug!("Generated: {}", INDEX_JSON);

        Ok(BuildSummary {
            posts: routes.len(),
            assets,
        })
    }

    /// Render the home page from the current content
    pub fn render_home(&self) -> Result<String> {
        let index = self.binder().index_props()?;
        self.render_home_with(&index)
    }

    /// Render one post page from the current content
    pub fn render_post(&self, id: &str) -> Result<String> {
        let page = self.binder().static_props(id)?;
        self.render_post_page(&page)
    }

    fn render_home_with(&self, posts: &[PostMetadata]) -> Result<String> {
        let mut context = self.base_context(true, "/");
        context.insert("posts", posts);
        self.renderer.render("home.html", &context)
    }

    fn render_post_page(&self, page: &PostPage) -> Result<String> {
        let mut context = self.base_context(false, &page.post.meta.path());
        context.insert("post", &page.post);
        context.insert("html", &page.html);
        self.renderer
            .render("post.html", &context)
            .with_context(|| format!("Failed to render page for post {:?}", page.post.meta.id))
    }

    /// Create a base context with common variables
    fn base_context(&self, is_home: bool, path: &str) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.site_data);
        context.insert("is_home", &is_home);
        context.insert("route_prefix", ROUTE_PREFIX);
        context.insert("canonical", &full_url_for(&self.site.config, path));
        context
    }

    fn write_page(&self, relative: &Path, html: &str) -> Result<PathBuf> {
        let output_path = self.site.output_dir.join(relative);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create dir {:?}", parent))?;
        }
        fs::write(&output_path, html)
            .with_context(|| format!("Failed to write {:?}", output_path))?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(output_path)
    }

    /// Copy the static asset directory into the output as-is
    fn copy_static_assets(&self) -> Result<usize> {
        let static_dir = &self.site.static_dir;
        if !static_dir.exists() {
            return Ok(0);
        }

        let mut copied = 0;
        for entry in WalkDir::new(static_dir).follow_links(true) {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(static_dir)?;
            let dest = self.site.output_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest).with_context(|| format!("Failed to copy {:?}", path))?;
            copied += 1;
        }

        tracing::debug!("Copied {} static assets", copied);
        Ok(copied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::ContentError;
    use tempfile::TempDir;

    fn site_with_posts(posts: &[(&str, &str)]) -> (TempDir, Site) {
        let dir = TempDir::new().unwrap();
        let mut config = SiteConfig::default();
        config.title = "Test Site".to_string();
        config.name = "Tester".to_string();
        let site = Site::with_config(dir.path().to_path_buf(), config);

        fs::create_dir_all(&site.content_dir).unwrap();
        for (name, content) in posts {
            fs::write(site.content_dir.join(name), content).unwrap();
        }
        (dir, site)
    }

    #[test]
    fn test_generate_writes_pages() {
        let (_dir, site) = site_with_posts(&[
            ("a.md", "---\ntitle: Post A\ndate: 2024-01-01\n---\nAlpha body"),
            ("b.mdx", "---\ntitle: Post B\ndate: 2024-06-01\n---\nBeta body"),
        ]);
        fs::create_dir_all(site.static_dir.join("images")).unwrap();
        fs::write(site.static_dir.join("images/profile.jpg"), b"jpg").unwrap();
        fs::write(site.static_dir.join("favicon.ico"), b"ico").unwrap();

        let generator = Generator::new(&site).unwrap();
        let summary = generator.generate().unwrap();
        assert_eq!(summary, BuildSummary { posts: 2, assets: 2 });

        let out = &site.output_dir;
        let home = fs::read_to_string(out.join("index.html")).unwrap();
        let b_pos = home.find("Post B").unwrap();
        let a_pos = home.find("Post A").unwrap();
        assert!(b_pos < a_pos, "newest post should be listed first");
        assert!(home.contains(r#"href="/posts/a""#));

        let post_a = fs::read_to_string(out.join("posts/a/index.html")).unwrap();
        assert!(post_a.contains("Alpha body"));
        assert!(post_a.contains("<title>Post A</title>"));
        assert!(post_a.contains(r#"href="http://localhost:3000/posts/a""#));
        assert!(out.join("posts/b/index.html").exists());

        assert_eq!(fs::read(out.join("images/profile.jpg")).unwrap(), b"jpg");

        let index: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join(INDEX_JSON)).unwrap()).unwrap();
        assert_eq!(index[0]["id"], "b");
        assert_eq!(index[1]["id"], "a");
    }

    #[test]
    fn test_generate_empty_site() {
        let (_dir, site) = site_with_posts(&[]);
        let summary = Generator::new(&site).unwrap().generate().unwrap();
        assert_eq!(summary, BuildSummary::default());
        assert!(site.output_dir.join("index.html").exists());
    }

    #[test]
    fn test_generate_fails_without_content_dir() {
        let dir = TempDir::new().unwrap();
        let site = Site::with_config(dir.path().to_path_buf(), SiteConfig::default());
        let err = Generator::new(&site).unwrap().generate().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ContentError>(),
            Some(ContentError::DirectoryUnreadable { .. })
        ));
    }

    #[test]
    fn test_render_post_not_found() {
        let (_dir, site) = site_with_posts(&[("a.md", "A")]);
        let err = Generator::new(&site).unwrap().render_post("zzz").unwrap_err();
        assert!(err
            .downcast_ref::<ContentError>()
            .map(ContentError::is_not_found)
            .unwrap_or(false));
    }

    #[test]
    fn test_generate_with_structured_title() {
        let (_dir, site) = site_with_posts(&[(
            "listy.md",
            "---\ntitle:\n  - x\n  - y\ndate: 2024-03-03\n---\nBody",
        )]);
        Generator::new(&site).unwrap().generate().unwrap();

        let home = fs::read_to_string(site.output_dir.join("index.html")).unwrap();
        assert!(home.contains(r#"href="/posts/listy">listy</a>"#));

        let page = fs::read_to_string(site.output_dir.join("posts/listy/index.html")).unwrap();
        assert!(page.contains("<title>listy</title>"));
        assert!(page.contains("March 3, 2024"));
    }
}

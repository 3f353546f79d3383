//! Create a new post

use anyhow::{bail, Result};
use std::fs;
use std::path::PathBuf;

use crate::helpers::today;
use crate::Site;

/// Create `<content_dir>/<slug>.<ext>` with title and date front-matter
pub fn create_post(site: &Site, title: &str, ext: &str) -> Result<PathBuf> {
    let ext = ext.trim_start_matches('.');
    if ext != "md" && ext != "mdx" {
        bail!("Unsupported extension: {}. Use md or mdx", ext);
    }

    let slug = slug::slugify(title);
    if slug.is_empty() {
        bail!("Cannot derive a file name from title {:?}", title);
    }

    fs::create_dir_all(&site.content_dir)?;

    // Either extension would claim the same route
    for existing in ["md", "mdx"] {
        let path = site.content_dir.join(format!("{}.{}", slug, existing));
        if path.exists() {
            bail!("Post already exists: {:?}", path);
        }
    }

    let file_path = site.content_dir.join(format!("{}.{}", slug, ext));
    let content = format!(
        "---\ntitle: {}\ndate: '{}'\n---\n\n",
        yaml_string(title),
        today()
    );
    fs::write(&file_path, content)?;

    tracing::info!("Created: {:?}", file_path);
    Ok(file_path)
}

/// Quote a scalar for YAML front-matter
fn yaml_string(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentStore;
    use tempfile::TempDir;

    #[test]
    fn test_create_post_is_loadable() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();

        let path = create_post(&site, "Hello: \"World\"", "mdx").unwrap();
        assert_eq!(path, site.content_dir.join("hello-world.mdx"));

        let post = ContentStore::new(&site.content_dir)
            .load_content("hello-world")
            .unwrap();
        assert_eq!(post.meta.title.as_deref(), Some("Hello: \"World\""));
        assert_eq!(post.meta.date, Some(today()));
        assert_eq!(post.body, "\n");
    }

    #[test]
    fn test_create_post_refuses_existing_route() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();

        create_post(&site, "Same Title", "md").unwrap();
        assert!(create_post(&site, "Same Title", "mdx").is_err());
    }

    #[test]
    fn test_create_post_rejects_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();
        assert!(create_post(&site, "Title", "txt").is_err());
    }
}

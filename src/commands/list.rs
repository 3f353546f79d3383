//! List site content

use anyhow::{bail, Result};

use crate::content::{ContentStore, MarkdownRenderer};
use crate::routes::PageBinder;
use crate::Site;

/// List posts or routes
pub fn run(site: &Site, content_type: &str) -> Result<()> {
    let store = ContentStore::new(&site.content_dir);
    let renderer = MarkdownRenderer::from_config(&site.config.markdown);
    let binder = PageBinder::new(&store, &renderer);

    match content_type {
        "post" | "posts" => {
            let posts = binder.index_props()?;
            println!("Posts ({}):", posts.len());
            for post in posts {
                println!(
                    "  {} - {} [{}]",
                    post.date.as_deref().unwrap_or("----------"),
                    post.title.as_deref().unwrap_or("(untitled)"),
                    post.id
                );
            }
        }
        "route" | "routes" => {
            let routes = binder.static_paths()?;
            println!("Routes ({}):", routes.len() + 1);
            println!("  /");
            for route in routes {
                println!("  {}", route.path());
            }
        }
        _ => {
            bail!("Unknown type: {}. Available: post, route", content_type);
        }
    }

    Ok(())
}

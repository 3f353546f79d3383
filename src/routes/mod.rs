//! Route/page binding - which pages exist, and the data each one needs

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;

use crate::content::{build_index, ContentStore, MarkdownRenderer, PostContent, PostMetadata, RouteParam};

/// Everything a post page needs to render
#[derive(Debug, Clone, Serialize)]
pub struct PostPage {
    pub post: PostContent,
    /// Body rendered to HTML
    pub html: String,
}

/// Binds content identifiers to pages.
///
/// Performs no markdown parsing of its own: bodies are handed to the
/// renderer untouched.
pub struct PageBinder<'a> {
    store: &'a ContentStore,
    renderer: &'a MarkdownRenderer,
}

impl<'a> PageBinder<'a> {
    pub fn new(store: &'a ContentStore, renderer: &'a MarkdownRenderer) -> Self {
        Self { store, renderer }
    }

    /// Routes to pre-generate, one per identifier
    pub fn static_paths(&self) -> Result<Vec<RouteParam>> {
        let routes = self.store.list_identifiers()?;

        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(routes.len());
        for route in routes {
            if seen.insert(route.id.clone()) {
                unique.push(route);
            } else {
                tracing::warn!(
                    "Several files map to post {:?}; generating {} once",
                    route.id,
                    route.path()
                );
            }
        }

        Ok(unique)
    }

    /// Load a post and render its body
    pub fn static_props(&self, id: &str) -> Result<PostPage> {
        let post = self.store.load_content(id)?;
        let html = self
            .renderer
            .render(&post.body)
            .with_context(|| format!("Failed to render post {:?}", id))?;

        Ok(PostPage { post, html })
    }

    /// All posts, newest first, for the listing page.
    ///
    /// One entry per route: when several files share an identifier the
    /// entry carries the metadata of the file its page is rendered from.
    pub fn index_props(&self) -> Result<Vec<PostMetadata>> {
        let mut posts: IndexMap<String, PostMetadata> = IndexMap::new();
        let mut duplicated = Vec::new();
        for post in self.store.list_metadata()? {
            if posts.contains_key(&post.id) {
                if !duplicated.contains(&post.id) {
                    duplicated.push(post.id.clone());
                }
            } else {
                posts.insert(post.id.clone(), post);
            }
        }

        for id in duplicated {
            tracing::warn!("Several files map to post {:?}; listing it once", id);
            let meta = self.store.load_content(&id)?.meta;
            posts.insert(id, meta);
        }

        Ok(build_index(posts.into_values().collect()))
    }
}

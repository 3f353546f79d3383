//! Content module - reads posts, parses front-matter, orders and renders them

mod error;
mod frontmatter;
mod index;
mod markdown;
mod post;
pub mod store;

pub use error::ContentError;
pub use frontmatter::{FrontMatter, FrontMatterError};
pub use index::build_index;
pub use markdown::MarkdownRenderer;
pub use post::{PostContent, PostMetadata, RouteParam, ROUTE_PREFIX};
pub use store::ContentStore;

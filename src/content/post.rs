//! Post models

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use super::FrontMatter;

/// URL prefix under which every post is routed
pub const ROUTE_PREFIX: &str = "/posts";

/// Keys that front-matter can never set
const RESERVED_KEYS: &[&str] = &["id", "body"];

/// Metadata of a single post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostMetadata {
    /// Identifier derived from the file name
    pub id: String,

    /// Post title, when the front-matter has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// ISO-8601 date string, used as the sort key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Every other front-matter field
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl PostMetadata {
    /// Merge parsed front-matter with the derived identifier
    pub fn from_front_matter(id: impl Into<String>, front_matter: FrontMatter) -> Self {
        let id = id.into();
        let mut extra = front_matter.fields;

        for key in RESERVED_KEYS {
            if extra.shift_remove(*key).is_some() {
                tracing::warn!("Ignoring reserved front-matter key {:?} in post {:?}", key, id);
            }
        }

        let title = take_scalar(&mut extra, "title");
        let date = take_scalar(&mut extra, "date");

        Self {
            id,
            title,
            date,
            extra,
        }
    }

    /// Route path of this post
    pub fn path(&self) -> String {
        post_path(&self.id)
    }
}

/// Remove `key` when it holds a scalar and return it as a string.
/// Lists and maps stay in `extra` untouched.
fn take_scalar(fields: &mut IndexMap<String, Value>, key: &str) -> Option<String> {
    let scalar = match fields.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        Value::Array(_) | Value::Object(_) => return None,
    };
    fields.shift_remove(key);
    scalar
}

/// A post together with its unparsed body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostContent {
    #[serde(flatten)]
    pub meta: PostMetadata,

    /// Raw markdown/MDX source without the front-matter block
    pub body: String,
}

/// One statically generated post route
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RouteParam {
    pub id: String,
}

impl RouteParam {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// URL path, e.g. `/posts/hello-world`
    pub fn path(&self) -> String {
        post_path(&self.id)
    }
}

fn post_path(id: &str) -> String {
    format!("{}/{}", ROUTE_PREFIX, id)
}

//! Content store - reads posts from a flat directory of markdown/MDX files

use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

use super::{ContentError, FrontMatter, PostContent, PostMetadata, RouteParam};

/// Extensions tried by `load_content`, in order
const EXTENSIONS: [&str; 2] = ["mdx", "md"];

lazy_static! {
    static ref CONTENT_EXTENSION: Regex = Regex::new(r"\.(md|mdx)$").unwrap();
}

/// Derive a post identifier from a file name.
///
/// Only `.md` and `.mdx` are stripped; other names come back unchanged.
pub fn identifier_for(file_name: &str) -> &str {
    match CONTENT_EXTENSION.find(file_name) {
        Some(m) => &file_name[..m.start()],
        None => file_name,
    }
}

/// Read-only view of the content directory.
///
/// Nothing is cached: every call re-reads the directory.
#[derive(Debug, Clone)]
pub struct ContentStore {
    dir: PathBuf,
}

impl ContentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// One route per file in the content directory
    pub fn list_identifiers(&self) -> Result<Vec<RouteParam>, ContentError> {
        Ok(self
            .files()?
            .iter()
            .map(|(name, _)| RouteParam::new(identifier_for(name)))
            .collect())
    }

    /// Metadata of every file, in file-name order
    pub fn list_metadata(&self) -> Result<Vec<PostMetadata>, ContentError> {
        let mut posts = Vec::new();
        for (name, path) in self.files()? {
            let (front_matter, _) = self.read_document(&path)?;
            posts.push(PostMetadata::from_front_matter(
                identifier_for(&name),
                front_matter,
            ));
        }
        Ok(posts)
    }

    /// Load one post, preferring `<id>.mdx` over `<id>.md`
    pub fn load_content(&self, id: &str) -> Result<PostContent, ContentError> {
        if !is_valid_identifier(id) {
            return Err(ContentError::InvalidIdentifier(id.to_string()));
        }

        let path = EXTENSIONS
            .iter()
            .map(|ext| self.dir.join(format!("{}.{}", id, ext)))
            .find(|path| path.is_file())
            .ok_or_else(|| ContentError::NotFound {
                id: id.to_string(),
                dir: self.dir.clone(),
            })?;

        tracing::debug!("Loading post {:?} from {:?}", id, path);
        let (front_matter, body) = self.read_document(&path)?;

        Ok(PostContent {
            meta: PostMetadata::from_front_matter(id, front_matter),
            body,
        })
    }

    /// Regular files in the directory as (display name, path), sorted by name.
    ///
    /// The name is lossy for non-UTF-8 file names; the path is kept as-is.
    fn files(&self) -> Result<Vec<(String, PathBuf)>, ContentError> {
        let unreadable = |source| ContentError::DirectoryUnreadable {
            path: self.dir.clone(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(unreadable)? {
            let entry = entry.map_err(unreadable)?;
            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            files.push((entry.file_name().to_string_lossy().into_owned(), path));
        }
        files.sort();

        Ok(files)
    }

    fn read_document(&self, path: &Path) -> Result<(FrontMatter, String), ContentError> {
        let text = fs::read_to_string(path).map_err(|source| ContentError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;

        let (front_matter, body) =
            FrontMatter::parse(&text).map_err(|source| ContentError::MalformedMetadata {
                path: path.to_path_buf(),
                source,
            })?;

        Ok((front_matter, body.to_string()))
    }
}

/// Identifiers name a file directly inside the content directory
fn is_valid_identifier(id: &str) -> bool {
    !id.is_empty() && id != "." && id != ".." && !id.contains(['/', '\\', '\0'])
}

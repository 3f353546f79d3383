//! Post index - orders posts for listing pages

use super::PostMetadata;

/// Sort posts newest first.
///
/// Dates compare as plain strings, which orders ISO-8601 dates correctly.
/// Posts without a date go last. The sort is stable, so posts sharing a
/// date keep their input order.
pub fn build_index(mut posts: Vec<PostMetadata>) -> Vec<PostMetadata> {
    // None < Some(_), so reversing the comparison puts undated posts at the end
    posts.sort_by(|a, b| b.date.cmp(&a.date));
    posts
}

//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::SiteConfig;

/// Characters left alone by JavaScript's `encodeURI`
const URI: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'#');

/// Percent-encode like `encodeURI`
pub fn encode_uri(s: &str) -> String {
    utf8_percent_encode(s, URI).to_string()
}

/// Social preview image URL for the site title
///
/// # Examples
/// ```ignore
/// og_image_url(&config) // -> "https://og-image.vercel.app/My%20Site.png?theme=light..."
/// ```
pub fn og_image_url(config: &SiteConfig) -> String {
    let base = config.og_image.base.trim_end_matches('/');
    let mut url = format!("{}/{}.png", base, encode_uri(&config.title));
    if !config.og_image.query.is_empty() {
        url.push('?');
        url.push_str(&config.og_image.query);
    }
    url
}

/// Absolute URL of a site path
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    format!(
        "{}/{}",
        config.url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

//! Address-bar input classification.

use crate::schema::SearchEngine;

/// Decide whether raw address-bar input is a url or a search query and
/// return a fully-qualified url either way. Empty input returns `None`.
///
/// Input counts as a url when it carries an explicit http(s) scheme, or
/// when it contains a dot and no whitespace ("example.com",
/// "docs.rs/serde"). Everything else goes to the configured search
/// engine.
pub fn classify_and_build_url(input: &str, engine: SearchEngine) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let has_scheme = input.starts_with("http://") || input.starts_with("https://");
    let looks_like_url = has_scheme || (input.contains('.') && !input.contains(' '));

    if looks_like_url {
        if has_scheme {
            Some(input.to_string())
        } else {
            Some(format!("https://{input}"))
        }
    } else {
        Some(engine.query_url(input))
    }
}

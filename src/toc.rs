//! Table-of-contents anchors for the rendered document.

use std::collections::HashMap;

/// GitHub-style heading slug:
/// - lowercase
/// - drop every char that isn't alphanumeric, space or hyphen
/// - replace spaces with hyphens
pub fn github_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        if c.is_alphanumeric() || c == ' ' || c == '-' {
            slug.push(c);
        }
    }
    slug.replace(' ', "-")
}

/// Hands out unique anchors; repeats get `-1`, `-2`, ... suffixes.
#[derive(Debug, Default)]
pub struct Anchors {
    seen: HashMap<String, usize>,
}

impl Anchors {
    pub fn unique(&mut self, text: &str) -> String {
        let mut base = github_slug(text);
        if base.is_empty() {
            base.push_str("section");
        }
        let count = self.seen.entry(base.clone()).or_insert(0);
        let anchor = if *count == 0 {
            base
        } else {
            format!("{}-{}", base, count)
        };
        *count += 1;
        anchor
    }
}

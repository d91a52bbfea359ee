//! Plugin slug extraction from fetched page content
//!
//! Two independent passes over the same body: a regex scan of the raw text
//! and an attribute scan of the parsed markup. Their union is the result, so
//! broken markup can never erase what the raw scan already found.

use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;

/// Path pattern that identifies a plugin reference
const PLUGIN_PATH_PATTERN: &str = r"wp-content/plugins/([a-zA-Z0-9_-]+)/";

/// Elements whose reference attributes are scanned in the markup pass
const REFERENCE_SELECTOR: &str = "link[href], script[href], script[src]";

/// Attributes that can carry an asset reference
const REFERENCE_ATTRS: [&str; 2] = ["href", "src"];

/// Extract every plugin slug referenced by a page.
///
/// Slugs are lowercased before insertion; the same plugin referenced with
/// different casing collapses to one entry. Pure function of the content,
/// never fails: at worst the markup pass contributes nothing and the
/// raw-text result stands alone.
pub fn extract_slugs(body: &str) -> HashSet<String> {
    let mut slugs = slugs_from_text(body);
    slugs.extend(slugs_from_markup(body));
    slugs
}

/// Scan raw body text for plugin paths.
///
/// Catches references anywhere in the page: inline scripts, CSS, comments,
/// attribute values as they appear on the wire.
pub fn slugs_from_text(text: &str) -> HashSet<String> {
    let re = Regex::new(PLUGIN_PATH_PATTERN).unwrap();
    let mut slugs = HashSet::new();
    collect_slugs(&re, text, &mut slugs);
    slugs
}

/// Scan parsed `link`/`script` reference attributes for plugin paths.
///
/// The parser decodes entity-encoded attribute values, so this pass catches
/// references the raw-text scan cannot see.
pub fn slugs_from_markup(html: &str) -> HashSet<String> {
    let mut slugs = HashSet::new();
    let Ok(selector) = Selector::parse(REFERENCE_SELECTOR) else {
        return slugs;
    };

    let document = Html::parse_document(html);
    let re = Regex::new(PLUGIN_PATH_PATTERN).unwrap();

    for element in document.select(&selector) {
        for attr in REFERENCE_ATTRS {
            if let Some(value) = element.value().attr(attr) {
                collect_slugs(&re, value, &mut slugs);
            }
        }
    }
    slugs
}

/// Apply the plugin path pattern to a piece of text, lowercasing matches
fn collect_slugs(re: &Regex, text: &str, slugs: &mut HashSet<String>) {
    for caps in re.captures_iter(text) {
        if let Some(slug) = caps.get(1) {
            slugs.insert(slug.as_str().to_ascii_lowercase());
        }
    }
}

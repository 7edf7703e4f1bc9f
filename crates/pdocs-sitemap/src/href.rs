//! Href resolution.

use pdocs_renderer::slugify;

/// Compute a node's effective href.
///
/// A non-empty explicit href is returned unchanged. Otherwise the node is
/// addressed as an anchor under its parent: `parent_href + "#" + slug`.
///
/// # Examples
///
/// ```
/// use pdocs_sitemap::resolve_href;
///
/// assert_eq!(resolve_href(Some("/x.html"), "/docs", "Anything"), "/x.html");
/// assert_eq!(resolve_href(None, "/docs", "Getting Started"), "/docs#getting-started");
/// assert_eq!(resolve_href(Some(""), "/docs", "v1.0"), "/docs#v10");
/// ```
#[must_use]
pub fn resolve_href(explicit: Option<&str>, parent_href: &str, text: &str) -> String {
    match explicit {
        Some(href) if !href.is_empty() => href.to_owned(),
        _ => format!("{parent_href}#{}", slugify(text)),
    }
}

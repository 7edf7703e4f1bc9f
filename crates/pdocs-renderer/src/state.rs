//! Heading tracking during parsing, plus the slug and escape helpers.

use std::collections::{HashMap, HashSet};

/// Fallback anchor id for headings whose text slugifies to nothing.
const EMPTY_HEADING_ID: &str = "heading";

/// State for tracking the heading currently being parsed.
///
/// Collects the heading's plain text (for the table of contents and the
/// anchor id) and hands out unique ids across the whole document.
#[derive(Default)]
pub(crate) struct HeadingState {
    /// Level of the heading being processed (None if not in a heading).
    current_level: Option<u8>,
    /// Buffer for heading plain text.
    text: String,
    /// Ids already handed out in this document.
    issued: HashSet<String>,
    /// Next suffix to try for each slug.
    next_suffix: HashMap<String, usize>,
}

impl HeadingState {
    /// Check if we're currently inside a heading.
    pub(crate) fn is_active(&self) -> bool {
        self.current_level.is_some()
    }

    /// Start tracking a heading.
    pub(crate) fn start_heading(&mut self, level: u8) {
        self.current_level = Some(level);
        self.text.clear();
    }

    /// Append text to the heading buffer.
    pub(crate) fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Complete the heading and assign its anchor id.
    ///
    /// An id set in the source (`{#custom}`) is kept unless an earlier
    /// heading already took it, in which case it gets a numeric suffix like
    /// a derived id. Returns (level, text, id) or `None` if not in a heading.
    pub(crate) fn complete_heading(
        &mut self,
        explicit_id: Option<&str>,
    ) -> Option<(u8, String, String)> {
        let level = self.current_level.take()?;
        let text = std::mem::take(&mut self.text).trim().to_owned();

        let id = match explicit_id {
            Some(id) if !id.is_empty() => self.unique_id(id.to_owned()),
            _ => {
                let slug = slugify(&text);
                if slug.is_empty() {
                    self.unique_id(EMPTY_HEADING_ID.to_owned())
                } else {
                    self.unique_id(slug)
                }
            }
        };

        Some((level, text, id))
    }

    /// Claim `base`, or the first free `base-N` if it is taken.
    fn unique_id(&mut self, base: String) -> String {
        let id = if self.issued.contains(&base) {
            let next = self.next_suffix.entry(base.clone()).or_insert(1);
            loop {
                let candidate = format!("{base}-{next}");
                *next += 1;
                if !self.issued.contains(&candidate) {
                    break candidate;
                }
            }
        } else {
            base
        };
        self.issued.insert(id.clone());
        id
    }
}

/// Slug used for sitemap hrefs and heading anchors.
///
/// Letters and digits are lowercased and kept. Each run of whitespace, `-`
/// and `_` between them becomes a single `-`. All other characters,
/// including `.` and backticks, are dropped.
///
/// # Examples
///
/// ```
/// use pdocs_renderer::slugify;
///
/// assert_eq!(slugify("Getting Started"), "getting-started");
/// assert_eq!(slugify("v1.2 `config`"), "v12-config");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() || matches!(c, '-' | '_') {
            pending_dash = true;
        }
    }

    slug
}

/// Escape text for HTML content and double-quoted attributes.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        let entity = match c {
            '&' => "&amp;",
            '<' => "&lt;",
            '>' => "&gt;",
            '"' => "&quot;",
            '\'' => "&#x27;",
            _ => {
                escaped.push(c);
                continue;
            }
        };
        escaped.push_str(entity);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_joins_words_with_single_dash() {
        for (text, slug) in [
            ("Getting Started", "getting-started"),
            ("  padded title\t", "padded-title"),
            ("one -- two __ three", "one-two-three"),
            ("-leading and trailing_", "leading-and-trailing"),
        ] {
            assert_eq!(slugify(text), slug, "{text:?}");
        }
    }

    #[test]
    fn test_slugify_drops_punctuation() {
        assert_eq!(slugify("Release 1.0"), "release-10");
        assert_eq!(slugify("The `toc` field"), "the-toc-field");
        assert_eq!(slugify("FAQ: why?"), "faq-why");
        assert_eq!(slugify("?!"), "");
    }

    #[test]
    fn test_slugify_keeps_unicode_letters() {
        assert_eq!(slugify("Über Straße"), "über-straße");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_heading_state_generates_ids() {
        let mut state = HeadingState::default();

        state.start_heading(2);
        assert!(state.is_active());
        state.push_text("Setup");
        let (level, text, id) = state.complete_heading(None).unwrap();

        assert_eq!(level, 2);
        assert_eq!(text, "Setup");
        assert_eq!(id, "setup");
        assert!(!state.is_active());
    }

    #[test]
    fn test_heading_state_deduplicates_ids() {
        let mut state = HeadingState::default();

        for expected in ["usage", "usage-1", "usage-2"] {
            state.start_heading(2);
            state.push_text("Usage");
            let (_, _, id) = state.complete_heading(None).unwrap();
            assert_eq!(id, expected);
        }
    }

    #[test]
    fn test_heading_state_keeps_explicit_id() {
        let mut state = HeadingState::default();

        state.start_heading(2);
        state.push_text("Usage");
        let (_, _, id) = state.complete_heading(Some("usage")).unwrap();
        assert_eq!(id, "usage");

        state.start_heading(2);
        state.push_text("Usage");
        let (_, _, id) = state.complete_heading(None).unwrap();
        assert_eq!(id, "usage-1");
    }

    #[test]
    fn test_heading_state_skips_ids_already_issued() {
        let mut state = HeadingState::default();
        let mut ids = Vec::new();

        for (text, explicit) in [
            ("Usage", None),
            ("Usage", None),
            ("Usage 1", None),
            ("Usage", None),
            ("Later", Some("usage")),
        ] {
            state.start_heading(2);
            state.push_text(text);
            ids.push(state.complete_heading(explicit).unwrap().2);
        }

        assert_eq!(ids, vec!["usage", "usage-1", "usage-1-1", "usage-2", "usage-3"]);
    }

    #[test]
    fn test_heading_state_empty_slug_falls_back() {
        let mut state = HeadingState::default();

        state.start_heading(1);
        state.push_text("???");
        let (_, _, id) = state.complete_heading(None).unwrap();
        assert_eq!(id, "heading");
    }

    #[test]
    fn test_complete_without_heading_returns_none() {
        let mut state = HeadingState::default();
        assert!(state.complete_heading(None).is_none());
    }
}

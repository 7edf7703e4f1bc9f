//! Table of contents synthesis.
//!
//! Turns the flat heading outline of a [`Document`](crate::Document) into a
//! nested [`Toc`], limited by a [`TocPolicy`].
//!
//! # Depth
//!
//! The top level is the smallest heading level present in the document.
//! [`TocPolicy::Depth(n)`](TocPolicy::Depth) keeps headings down to `n`
//! levels below it, so with `# Intro > ## Setup > ### Advanced` a depth of 1
//! keeps `Intro` and `Setup`.
//!
//! Nesting follows heading levels with skipped levels compacted: an H3
//! directly after an H1 becomes a child of the H1.

use std::fmt::Write;

use crate::document::Heading;
use crate::state::escape_html;

/// Element id of the rendered TOC list.
const TOC_LIST_ID: &str = "toc-list";

/// How much of the heading outline goes into the table of contents.
///
/// Front matter encodes this as an integer: `-1` disables the TOC, `0` means
/// no depth limit, `n > 0` limits the TOC to `n` levels below the top
/// heading level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TocPolicy {
    /// No table of contents.
    #[default]
    Disabled,
    /// Every heading level.
    Unlimited,
    /// Top heading level plus this many levels below it.
    Depth(u32),
}

impl TocPolicy {
    /// Build a policy from its integer encoding.
    ///
    /// Values below `-1` clamp to [`TocPolicy::Disabled`].
    #[must_use]
    pub fn from_level(value: i64) -> Self {
        match value {
            ..0 => Self::Disabled,
            0 => Self::Unlimited,
            n => Self::Depth(u32::try_from(n).unwrap_or(u32::MAX)),
        }
    }

    /// Integer encoding of the policy (`-1`, `0` or the depth).
    #[must_use]
    pub fn as_level(self) -> i64 {
        match self {
            Self::Disabled => -1,
            Self::Unlimited => 0,
            Self::Depth(n) => i64::from(n),
        }
    }

    /// Check if a table of contents was requested.
    #[must_use]
    pub fn is_enabled(self) -> bool {
        self != Self::Disabled
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for TocPolicy {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_level())
    }
}

/// One entry of the table of contents.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TocNode {
    /// Heading text.
    pub title: String,
    /// Anchor ID of the heading.
    pub id: String,
    /// Heading level (1-6).
    pub level: u8,
    /// Nested headings.
    pub children: Vec<TocNode>,
}

/// Hierarchical table of contents of one document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Toc {
    /// Top-level entries in document order.
    pub items: Vec<TocNode>,
}

impl Toc {
    /// Number of entries at every depth.
    #[must_use]
    pub fn len(&self) -> usize {
        fn count(nodes: &[TocNode]) -> usize {
            nodes.iter().map(|n| 1 + count(&n.children)).sum()
        }
        count(&self.items)
    }

    /// Check if the table of contents has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Error raised when the heading outline cannot be turned into a TOC.
#[derive(Debug, thiserror::Error)]
pub enum TocError {
    /// Heading level outside 1-6.
    #[error("heading {title:?} has invalid level {level}")]
    InvalidLevel {
        /// Heading text.
        title: String,
        /// Offending level.
        level: u8,
    },
    /// Heading without an anchor id.
    #[error("heading {title:?} has no anchor id")]
    MissingAnchor {
        /// Heading text.
        title: String,
    },
}

/// Build the table of contents for a heading outline.
///
/// Returns `Ok(None)` when the policy is [`TocPolicy::Disabled`] or when the
/// document has no headings.
///
/// # Errors
///
/// Returns [`TocError`] if a heading has an invalid level or no anchor id.
pub fn synthesize(headings: &[Heading], policy: TocPolicy) -> Result<Option<Toc>, TocError> {
    if !policy.is_enabled() {
        return Ok(None);
    }

    for heading in headings {
        if !(1..=6).contains(&heading.level) {
            return Err(TocError::InvalidLevel {
                title: heading.title.clone(),
                level: heading.level,
            });
        }
        if heading.id.is_empty() {
            return Err(TocError::MissingAnchor {
                title: heading.title.clone(),
            });
        }
    }

    let Some(top) = headings.iter().map(|h| h.level).min() else {
        return Ok(None);
    };
    let max_level = match policy {
        TocPolicy::Depth(n) => u32::from(top).saturating_add(n),
        _ => u32::MAX,
    };

    // Stack of open entries; each is finished once a heading of the same or
    // a higher level arrives.
    let mut items: Vec<TocNode> = Vec::new();
    let mut stack: Vec<TocNode> = Vec::new();

    for heading in headings
        .iter()
        .filter(|h| u32::from(h.level) <= max_level)
    {
        while stack.last().is_some_and(|open| open.level >= heading.level) {
            close_last(&mut stack, &mut items);
        }
        stack.push(TocNode {
            title: heading.title.clone(),
            id: heading.id.clone(),
            level: heading.level,
            children: Vec::new(),
        });
    }
    while !stack.is_empty() {
        close_last(&mut stack, &mut items);
    }

    Ok(Some(Toc { items }))
}

/// Pop the innermost open entry and attach it to its parent (or the root).
fn close_last(stack: &mut Vec<TocNode>, items: &mut Vec<TocNode>) {
    if let Some(node) = stack.pop() {
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => items.push(node),
        }
    }
}

/// Render the table of contents as a nested HTML list.
///
/// The outer list carries `id="toc-list"`; every entry links to its heading
/// anchor.
#[must_use]
pub fn render_list(toc: &Toc) -> String {
    let mut html = String::with_capacity(256);
    let _ = write!(html, r#"<ul id="{TOC_LIST_ID}">"#);
    render_items(&mut html, &toc.items);
    html.push_str("</ul>\n");
    html
}

fn render_items(html: &mut String, items: &[TocNode]) {
    for item in items {
        let _ = write!(
            html,
            r##"<li><a href="#{}">{}</a>"##,
            escape_html(&item.id),
            escape_html(&item.title)
        );
        if !item.children.is_empty() {
            html.push_str("<ul>");
            render_items(html, &item.children);
            html.push_str("</ul>");
        }
        html.push_str("</li>");
    }
}

//! Sitemap input model.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry of the authored sitemap.
///
/// This is the configuration form of the tree: entries own their children
/// and every field except `text` is optional.
///
/// ```toml
/// [sitemap]
/// text = "Home"
///
/// [[sitemap.children]]
/// text = "Intro"
/// href = "/intro.html"
/// page = "intro.md"
/// tag = "guide"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SitemapEntry {
    /// Display text.
    pub text: String,
    /// Explicit href. When empty the href is derived from the parent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// Markdown source, relative to the source directory.
    /// Entries without a page are pure navigation nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PathBuf>,
    /// Tag used for cross-referencing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Hide from navigation (templates decide what that means).
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
    /// Template override for this entry's page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Free-form values passed through to templates.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub vars: Map<String, Value>,
    /// Child entries in display order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SitemapEntry>,
}

impl SitemapEntry {
    /// Create an entry with display text only.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Set the explicit href.
    #[must_use]
    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    /// Set the markdown source.
    #[must_use]
    pub fn with_page(mut self, page: impl Into<PathBuf>) -> Self {
        self.page = Some(page.into());
        self
    }

    /// Set the tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Set the template override.
    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Set a template variable.
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Mark the entry as hidden.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Append a child entry.
    #[must_use]
    pub fn with_child(mut self, child: SitemapEntry) -> Self {
        self.children.push(child);
        self
    }

    /// Number of entries in this subtree, including this one.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(SitemapEntry::node_count)
            .sum::<usize>()
    }
}

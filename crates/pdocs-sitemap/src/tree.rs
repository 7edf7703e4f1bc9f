//! Arena-backed sitemap tree.
//!
//! Nodes live in a flat `Vec<SitemapNode>` with parent/children relationships
//! tracked by [`NodeId`] handles. Construction happens on a
//! [`SitemapBuilder`]; [`SitemapBuilder::annotate`] consumes the builder,
//! resolves every href in one pre-order pass and returns the read-only
//! [`SitemapTree`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::entry::SitemapEntry;
use crate::href::resolve_href;
use crate::tag_index::TagIndex;

/// Handle to a node in a sitemap arena.
///
/// Handles are only meaningful for the builder or tree that produced them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn from_raw(index: usize) -> Self {
        Self(index)
    }
}

/// Where a node came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeOrigin {
    /// Authored in the sitemap configuration.
    #[default]
    Sitemap,
    /// Grafted from a heading of a page's table of contents.
    Heading,
}

/// One node of the sitemap.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SitemapNode {
    /// Display text.
    pub text: String,
    /// Explicit href from the configuration, if any.
    pub explicit_href: Option<String>,
    /// Resolved href of the parent. Empty for the root.
    pub parent_href: String,
    /// Resolved href of this node.
    pub href: String,
    /// Markdown source, relative to the source directory.
    pub page: Option<PathBuf>,
    /// Tag used for cross-referencing.
    pub tag: Option<String>,
    /// Hidden from navigation.
    pub hidden: bool,
    /// Template override.
    pub template: Option<String>,
    /// Free-form template values.
    pub vars: Map<String, Value>,
    /// Node origin.
    pub origin: NodeOrigin,
}

impl SitemapNode {
    /// Create a sitemap node with display text only.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Create a node for a page heading, addressed by an explicit href.
    #[must_use]
    pub fn heading(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            explicit_href: Some(href.into()),
            origin: NodeOrigin::Heading,
            ..Self::default()
        }
    }

    /// Build a node from a configuration entry (children excluded).
    ///
    /// Empty strings and empty paths count as absent.
    #[must_use]
    pub fn from_entry(entry: &SitemapEntry) -> Self {
        Self {
            text: entry.text.clone(),
            explicit_href: non_empty(entry.href.as_deref()),
            parent_href: String::new(),
            href: String::new(),
            page: entry
                .page
                .as_ref()
                .filter(|p| !p.as_os_str().is_empty())
                .cloned(),
            tag: non_empty(entry.tag.as_deref()),
            hidden: entry.hidden,
            template: non_empty(entry.template.as_deref()),
            vars: entry.vars.clone(),
            origin: NodeOrigin::Sitemap,
        }
    }

    /// Check if the node has a markdown source.
    #[must_use]
    pub fn has_page(&self) -> bool {
        self.page.is_some()
    }

    /// Check if the node was grafted from a heading.
    #[must_use]
    pub fn is_heading(&self) -> bool {
        self.origin == NodeOrigin::Heading
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_owned)
}

/// Collect node ids in pre-order (parent before children, children in order).
fn pre_order_from(children: &[Vec<NodeId>], start: NodeId) -> Vec<NodeId> {
    let mut order = Vec::with_capacity(children.len());
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        order.push(id);
        stack.extend(children[id.0].iter().rev().copied());
    }
    order
}

/// Mutable sitemap under construction.
///
/// Hrefs are not resolved yet; use [`effective_href`](Self::effective_href)
/// when an href is needed before annotation.
#[derive(Debug)]
pub struct SitemapBuilder {
    nodes: Vec<SitemapNode>,
    children: Vec<Vec<NodeId>>,
    parents: Vec<Option<NodeId>>,
}

impl SitemapBuilder {
    /// Create a builder holding only a root node.
    #[must_use]
    pub fn new(root: SitemapNode) -> Self {
        Self {
            nodes: vec![root],
            children: vec![Vec::new()],
            parents: vec![None],
        }
    }

    /// Build the arena from a configuration tree, in pre-order.
    #[must_use]
    pub fn from_entry(root: &SitemapEntry) -> Self {
        let mut builder = Self::new(SitemapNode::from_entry(root));
        builder.add_entries(builder.root(), &root.children);
        builder
    }

    fn add_entries(&mut self, parent: NodeId, entries: &[SitemapEntry]) {
        for entry in entries {
            let id = self.add_node(parent, SitemapNode::from_entry(entry));
            self.add_entries(id, &entry.children);
        }
    }

    /// Root node handle.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append `node` as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this builder.
    pub fn add_node(&mut self, parent: NodeId, node: SitemapNode) -> NodeId {
        assert!(parent.0 < self.nodes.len(), "unknown parent node {parent:?}");
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.children.push(Vec::new());
        self.parents.push(Some(parent));
        self.children[parent.0].push(id);
        id
    }

    /// Get a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this builder.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &SitemapNode {
        &self.nodes[id.0]
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a builder has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes with a markdown source, in pre-order.
    #[must_use]
    pub fn content_nodes(&self) -> Vec<NodeId> {
        pre_order_from(&self.children, self.root())
            .into_iter()
            .filter(|&id| self.nodes[id.0].has_page())
            .collect()
    }

    /// Href the node will have after annotation.
    ///
    /// Walks up to the nearest ancestor with an explicit href (or the root)
    /// and resolves downwards from there.
    #[must_use]
    pub fn effective_href(&self, id: NodeId) -> String {
        let mut chain = vec![id];
        let mut current = id;
        while self.nodes[current.0]
            .explicit_href
            .as_deref()
            .is_none_or(str::is_empty)
            && let Some(parent) = self.parents[current.0]
        {
            chain.push(parent);
            current = parent;
        }

        let mut href = String::new();
        for &node_id in chain.iter().rev() {
            let node = &self.nodes[node_id.0];
            href = if self.parents[node_id.0].is_none() {
                node.explicit_href.clone().unwrap_or_default()
            } else {
                resolve_href(node.explicit_href.as_deref(), &href, &node.text)
            };
        }
        href
    }

    /// Resolve every href and freeze the tree.
    ///
    /// Single pre-order pass: the root keeps its explicit href (or none),
    /// every other node gets its parent's resolved href as `parent_href` and
    /// its own href from [`resolve_href`].
    #[must_use]
    pub fn annotate(mut self) -> SitemapTree {
        let root = self.root();
        for id in pre_order_from(&self.children, root) {
            let parent_href = match self.parents[id.0] {
                Some(parent) => self.nodes[parent.0].href.clone(),
                None => String::new(),
            };
            let node = &mut self.nodes[id.0];
            node.href = if id == root {
                node.explicit_href.clone().unwrap_or_default()
            } else {
                resolve_href(node.explicit_href.as_deref(), &parent_href, &node.text)
            };
            node.parent_href = parent_href;
        }

        let href_index = self
            .nodes
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, node)| !node.href.is_empty())
            .map(|(i, node)| (node.href.clone(), NodeId(i)))
            .collect();

        tracing::debug!(nodes = self.nodes.len(), "Annotated sitemap");

        SitemapTree {
            nodes: self.nodes,
            children: self.children,
            parents: self.parents,
            href_index,
        }
    }
}

/// Annotated, read-only sitemap.
#[derive(Debug)]
pub struct SitemapTree {
    nodes: Vec<SitemapNode>,
    children: Vec<Vec<NodeId>>,
    parents: Vec<Option<NodeId>>,
    href_index: HashMap<String, NodeId>,
}

impl SitemapTree {
    /// Root node handle.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Get a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &SitemapNode {
        &self.nodes[id.0]
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree has no nodes (never true for a built tree).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Children of a node in display order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.children[id.0]
    }

    /// Parent of a node (`None` for the root).
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents[id.0]
    }

    /// Ancestors of a node, root first, excluding the node itself.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut ancestors = Vec::new();
        let mut current = self.parents[id.0];
        while let Some(parent) = current {
            ancestors.push(parent);
            current = self.parents[parent.0];
        }
        ancestors.reverse();
        ancestors
    }

    /// All nodes in pre-order.
    #[must_use]
    pub fn pre_order(&self) -> Vec<NodeId> {
        pre_order_from(&self.children, self.root())
    }

    /// Nodes with a markdown source, in pre-order.
    ///
    /// This is the previous/next sequence of the site.
    #[must_use]
    pub fn flatten_content_nodes(&self) -> Vec<NodeId> {
        self.pre_order()
            .into_iter()
            .filter(|&id| self.nodes[id.0].has_page())
            .collect()
    }

    /// First node (in arena order) with the given resolved href.
    #[must_use]
    pub fn find_by_href(&self, href: &str) -> Option<NodeId> {
        self.href_index.get(href).copied()
    }

    /// First node with the given markdown source.
    #[must_use]
    pub fn find_by_page(&self, page: &Path) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.page.as_deref() == Some(page))
            .map(NodeId)
    }

    /// Index tagged nodes by tag.
    ///
    /// A node is indexed only when both its tag and its resolved href are
    /// non-empty. Buckets keep document (pre-order) order.
    #[must_use]
    pub fn build_tag_index(&self) -> TagIndex {
        let mut index = TagIndex::default();
        for id in self.pre_order() {
            let node = &self.nodes[id.0];
            if let Some(tag) = node.tag.as_deref()
                && !tag.is_empty()
                && !node.href.is_empty()
            {
                index.insert(tag, id);
            }
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample() -> SitemapEntry {
        SitemapEntry::new("Home")
            .with_child(
                SitemapEntry::new("Guide")
                    .with_href("/guide.html")
                    .with_page("guide.md")
                    .with_tag("docs")
                    .with_child(SitemapEntry::new("Install Steps").with_page("install.md"))
                    .with_child(SitemapEntry::new("Config").with_tag("docs")),
            )
            .with_child(
                SitemapEntry::new("Reference")
                    .with_child(SitemapEntry::new("API").with_href("/api.html").with_page("api.md")),
            )
    }

    fn texts(tree: &SitemapTree, ids: &[NodeId]) -> Vec<String> {
        ids.iter().map(|&id| tree.node(id).text.clone()).collect()
    }

    #[test]
    fn test_from_entry_is_pre_order() {
        let builder = SitemapBuilder::from_entry(&sample());

        let texts: Vec<_> = (0..builder.len())
            .map(|i| builder.node(NodeId(i)).text.as_str())
            .collect();
        assert_eq!(
            texts,
            vec!["Home", "Guide", "Install Steps", "Config", "Reference", "API"]
        );
    }

    #[test]
    fn test_from_entry_normalizes_empty_fields() {
        let mut entry = SitemapEntry::new("Home")
            .with_child(SitemapEntry::new("Group").with_href("").with_page("").with_tag(""));
        entry.children[0].template = Some(String::new());
        let builder = SitemapBuilder::from_entry(&entry);

        let group = builder.node(NodeId(1));
        assert_eq!(group.explicit_href, None);
        assert_eq!(group.page, None);
        assert_eq!(group.tag, None);
        assert_eq!(group.template, None);
    }

    #[test]
    fn test_annotate_resolves_hrefs() {
        let tree = SitemapBuilder::from_entry(&sample()).annotate();

        let hrefs: Vec<_> = tree
            .pre_order()
            .into_iter()
            .map(|id| tree.node(id).href.clone())
            .collect();
        assert_eq!(
            hrefs,
            vec![
                "",
                "/guide.html",
                "/guide.html#install-steps",
                "/guide.html#config",
                "#reference",
                "/api.html",
            ]
        );
    }

    #[test]
    fn test_annotate_sets_parent_href() {
        let tree = SitemapBuilder::from_entry(&sample()).annotate();
        let guide = tree.children(tree.root())[0];
        let install = tree.children(guide)[0];

        assert_eq!(tree.node(tree.root()).parent_href, "");
        assert_eq!(tree.node(guide).parent_href, "");
        assert_eq!(tree.node(install).parent_href, "/guide.html");
    }

    #[test]
    fn test_root_keeps_explicit_href() {
        let tree = SitemapBuilder::from_entry(
            &SitemapEntry::new("Home")
                .with_href("/index.html")
                .with_child(SitemapEntry::new("About")),
        )
        .annotate();

        assert_eq!(tree.node(tree.root()).href, "/index.html");
        assert_eq!(tree.node(NodeId(1)).href, "/index.html#about");
    }

    #[test]
    fn test_effective_href_matches_annotation() {
        let builder = SitemapBuilder::from_entry(&sample());
        let expected: Vec<_> = (0..builder.len())
            .map(|i| builder.effective_href(NodeId(i)))
            .collect();

        let tree = builder.annotate();
        let actual: Vec<_> = (0..tree.len())
            .map(|i| tree.node(NodeId(i)).href.clone())
            .collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_added_nodes_follow_their_parent_in_pre_order() {
        let mut builder = SitemapBuilder::from_entry(&sample());
        let guide = builder.children[0][0];
        builder.add_node(guide, SitemapNode::heading("Overview", "/guide.html#overview"));

        let tree = builder.annotate();
        assert_eq!(
            texts(&tree, &tree.pre_order()),
            vec!["Home", "Guide", "Install Steps", "Config", "Overview", "Reference", "API"]
        );
    }

    #[test]
    fn test_flatten_content_nodes() {
        let tree = SitemapBuilder::from_entry(&sample()).annotate();

        assert_eq!(
            texts(&tree, &tree.flatten_content_nodes()),
            vec!["Guide", "Install Steps", "API"]
        );
    }

    #[test]
    fn test_heading_nodes_are_not_content() {
        let mut builder = SitemapBuilder::from_entry(&sample());
        let guide = builder.children[0][0];
        let heading = builder.add_node(guide, SitemapNode::heading("Usage", "/guide.html#usage"));

        let tree = builder.annotate();
        assert!(tree.node(heading).is_heading());
        assert!(!tree.flatten_content_nodes().contains(&heading));
    }

    #[test]
    fn test_ancestors_root_first() {
        let tree = SitemapBuilder::from_entry(&sample()).annotate();
        let guide = tree.children(tree.root())[0];
        let install = tree.children(guide)[0];

        assert_eq!(tree.ancestors(install), vec![tree.root(), guide]);
        assert!(tree.ancestors(tree.root()).is_empty());
        assert_eq!(tree.parent(install), Some(guide));
    }

    #[test]
    fn test_find_by_href_and_page() {
        let tree = SitemapBuilder::from_entry(&sample()).annotate();

        let api = tree.find_by_href("/api.html").unwrap();
        assert_eq!(tree.node(api).text, "API");
        let install = tree.find_by_page(Path::new("install.md")).unwrap();
        assert_eq!(tree.node(install).text, "Install Steps");
        assert!(tree.find_by_href("/missing.html").is_none());
    }

    #[test]
    fn test_tag_index_requires_tag_and_href() {
        let tree = SitemapBuilder::from_entry(&sample()).annotate();
        let index = tree.build_tag_index();

        assert_eq!(texts(&tree, index.get("docs")), vec!["Guide", "Config"]);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_tag_index_skips_empty_href() {
        // The root has no explicit href, so its href stays empty.
        let tree = SitemapBuilder::from_entry(
            &SitemapEntry::new("Home")
                .with_tag("top")
                .with_child(SitemapEntry::new("Child").with_tag("top")),
        )
        .annotate();
        let index = tree.build_tag_index();

        assert_eq!(texts(&tree, index.get("top")), vec!["Child"]);
    }
}

//! Serializable views of sitemap nodes.

use std::collections::BTreeMap;

use pdocs_renderer::slugify;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::tag_index::TagIndex;
use crate::tree::{NodeId, NodeOrigin, SitemapTree};

/// Borrowed view of a node, serialized for templates.
///
/// A deep view includes the whole subtree under `children`; a shallow view
/// (used for previous/next links and tag lists) leaves it out.
///
/// ```json
/// {"text": "Guide", "href": "/guide.html", "slug": "guide", "page": "guide.md",
///  "tag": "docs", "hidden": false, "vars": {}, "heading": false, "children": []}
/// ```
#[derive(Clone, Copy, Debug)]
pub struct NodeView<'a> {
    tree: &'a SitemapTree,
    id: NodeId,
    deep: bool,
}

impl<'a> NodeView<'a> {
    /// View of a node including its subtree.
    #[must_use]
    pub fn deep(tree: &'a SitemapTree, id: NodeId) -> Self {
        Self {
            tree,
            id,
            deep: true,
        }
    }

    /// View of a node without its subtree.
    #[must_use]
    pub fn shallow(tree: &'a SitemapTree, id: NodeId) -> Self {
        Self {
            tree,
            id,
            deep: false,
        }
    }

    /// Shallow views of several nodes.
    #[must_use]
    pub fn many(tree: &'a SitemapTree, ids: &[NodeId]) -> Vec<Self> {
        ids.iter().map(|&id| Self::shallow(tree, id)).collect()
    }

    /// Tag index as tag -> shallow node views.
    #[must_use]
    pub fn tag_index(tree: &'a SitemapTree, index: &TagIndex) -> BTreeMap<String, Vec<Self>> {
        index
            .iter()
            .map(|(tag, ids)| (tag.to_owned(), Self::many(tree, ids)))
            .collect()
    }

    /// Node handle.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }
}

impl Serialize for NodeView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let node = self.tree.node(self.id);
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("text", &node.text)?;
        map.serialize_entry("href", &node.href)?;
        map.serialize_entry("slug", &slugify(&node.text))?;
        map.serialize_entry(
            "page",
            &node.page.as_ref().map(|p| p.to_string_lossy().replace('\\', "/")),
        )?;
        map.serialize_entry("tag", &node.tag)?;
        map.serialize_entry("hidden", &node.hidden)?;
        map.serialize_entry("vars", &node.vars)?;
        map.serialize_entry("heading", &(node.origin == NodeOrigin::Heading))?;
        if self.deep {
            let children: Vec<_> = self
                .tree
                .children(self.id)
                .iter()
                .map(|&child| Self::deep(self.tree, child))
                .collect();
            map.serialize_entry("children", &children)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::{SitemapBuilder, SitemapEntry, SitemapNode};

    fn tree() -> SitemapTree {
        let root = SitemapEntry::new("Home").with_child(
            SitemapEntry::new("Guide")
                .with_href("/guide.html")
                .with_page("guide.md")
                .with_tag("docs")
                .with_var("icon", "book"),
        );
        let mut builder = SitemapBuilder::from_entry(&root);
        let guide = builder.content_nodes()[0];
        builder.add_node(guide, SitemapNode::heading("Usage", "/guide.html#usage"));
        builder.annotate()
    }

    #[test]
    fn test_deep_view_serializes_subtree() {
        let tree = tree();
        let value = serde_json::to_value(NodeView::deep(&tree, tree.root())).unwrap();

        assert_eq!(
            value,
            json!({
                "text": "Home",
                "href": "",
                "slug": "home",
                "page": null,
                "tag": null,
                "hidden": false,
                "vars": {},
                "heading": false,
                "children": [{
                    "text": "Guide",
                    "href": "/guide.html",
                    "slug": "guide",
                    "page": "guide.md",
                    "tag": "docs",
                    "hidden": false,
                    "vars": {"icon": "book"},
                    "heading": false,
                    "children": [{
                        "text": "Usage",
                        "href": "/guide.html#usage",
                        "slug": "usage",
                        "page": null,
                        "tag": null,
                        "hidden": false,
                        "vars": {},
                        "heading": true,
                        "children": []
                    }]
                }]
            })
        );
    }

    #[test]
    fn test_shallow_view_omits_children() {
        let tree = tree();
        let value = serde_json::to_value(NodeView::shallow(&tree, tree.root())).unwrap();

        assert!(value.get("children").is_none());
        assert_eq!(value["text"], "Home");
    }

    #[test]
    fn test_tag_index_view() {
        let tree = tree();
        let index = tree.build_tag_index();
        let value = serde_json::to_value(NodeView::tag_index(&tree, &index)).unwrap();

        assert_eq!(value["docs"][0]["href"], "/guide.html");
        assert_eq!(value["docs"].as_array().map(Vec::len), Some(1));
    }
}

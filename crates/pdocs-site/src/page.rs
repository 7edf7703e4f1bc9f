//! Per-page render context.

use std::path::{Path, PathBuf};

use pdocs_renderer::Toc;
use pdocs_sitemap::{NodeId, NodeView, SitemapTree, TagIndex};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::front_matter::PageMetadata;

/// A page after loading: metadata, table of contents and rendered HTML.
#[derive(Clone, Debug)]
pub struct RenderedDocument {
    /// Markdown source, relative to the source directory.
    pub source: PathBuf,
    /// Coerced front matter.
    pub metadata: PageMetadata,
    /// Table of contents, when requested and the page has headings.
    pub toc: Option<Toc>,
    /// Rendered page body.
    pub html: String,
    /// Rendered table of contents list.
    pub toc_html: Option<String>,
}

/// Render context for one page.
///
/// Borrows the annotated tree and tag index; built right before the page is
/// rendered and dropped after it is written.
///
/// Serialized (as `page` in templates) to:
///
/// | Key           | Value                                              |
/// |---------------|----------------------------------------------------|
/// | `source`      | source path, `/`-separated                         |
/// | `href`        | resolved href of the page                          |
/// | `title`       | front matter title, or the sitemap text if empty   |
/// | `meta`        | [`PageMetadata`]                                   |
/// | `toc_tree`    | [`Toc`] or null                                    |
/// | `current`     | the page's node with its subtree                   |
/// | `previous`    | previous content node or null                      |
/// | `next`        | next content node or null                          |
/// | `root`        | the whole sitemap                                  |
/// | `breadcrumbs` | ancestors, root first                              |
/// | `tags`        | tag index, tag to nodes                            |
/// | `cache_id`    | site-wide cache-busting id                         |
///
/// The page body and TOC list are passed to templates separately, as
/// already-escaped HTML.
#[derive(Debug)]
pub struct Page<'a> {
    /// Loaded document.
    pub document: &'a RenderedDocument,
    /// Annotated sitemap.
    pub tree: &'a SitemapTree,
    /// Tag index of `tree`.
    pub tag_index: &'a TagIndex,
    /// The page's own node.
    pub current: NodeId,
    /// Previous content node in site order.
    pub previous: Option<NodeId>,
    /// Next content node in site order.
    pub next: Option<NodeId>,
    /// Ancestors of `current`, root first.
    pub breadcrumbs: Vec<NodeId>,
    /// Site-wide cache-busting id.
    pub cache_id: &'a str,
}

impl Page<'_> {
    /// Resolved href of the page.
    #[must_use]
    pub fn href(&self) -> &str {
        &self.tree.node(self.current).href
    }

    /// Source path of the page.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.document.source
    }

    /// Display title: front matter title, falling back to the sitemap text.
    #[must_use]
    pub fn title(&self) -> &str {
        let title = &self.document.metadata.title;
        if title.is_empty() {
            &self.tree.node(self.current).text
        } else {
            title
        }
    }

    /// Template to render with.
    ///
    /// Front matter `template` wins over the sitemap node's `template`,
    /// which wins over `default`.
    #[must_use]
    pub fn template<'b>(&'b self, default: &'b str) -> &'b str {
        self.document
            .metadata
            .template
            .as_deref()
            .or(self.tree.node(self.current).template.as_deref())
            .unwrap_or(default)
    }
}

impl Serialize for Page<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let tree = self.tree;
        let mut map = serializer.serialize_map(Some(12))?;
        map.serialize_entry(
            "source",
            &self.document.source.to_string_lossy().replace('\\', "/"),
        )?;
        map.serialize_entry("href", self.href())?;
        map.serialize_entry("title", self.title())?;
        map.serialize_entry("meta", &self.document.metadata)?;
        map.serialize_entry("toc_tree", &self.document.toc)?;
        map.serialize_entry("current", &NodeView::deep(tree, self.current))?;
        map.serialize_entry(
            "previous",
            &self.previous.map(|id| NodeView::shallow(tree, id)),
        )?;
        map.serialize_entry("next", &self.next.map(|id| NodeView::shallow(tree, id)))?;
        map.serialize_entry("root", &NodeView::deep(tree, tree.root()))?;
        map.serialize_entry("breadcrumbs", &NodeView::many(tree, &self.breadcrumbs))?;
        map.serialize_entry("tags", &NodeView::tag_index(tree, self.tag_index))?;
        map.serialize_entry("cache_id", self.cache_id)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use pdocs_sitemap::{SitemapBuilder, SitemapEntry};
    use pretty_assertions::assert_eq;

    use super::*;

    fn tree() -> SitemapTree {
        SitemapBuilder::from_entry(
            &SitemapEntry::new("Home")
                .with_child(
                    SitemapEntry::new("A")
                        .with_href("/a")
                        .with_page("a.md")
                        .with_template("node.html"),
                )
                .with_child(
                    SitemapEntry::new("B")
                        .with_href("/b")
                        .with_page("b.md")
                        .with_tag("guide"),
                ),
        )
        .annotate()
    }

    fn document(metadata: PageMetadata) -> RenderedDocument {
        RenderedDocument {
            source: PathBuf::from("a.md"),
            metadata,
            toc: None,
            html: "<p>A</p>".to_owned(),
            toc_html: None,
        }
    }

    fn page<'a>(
        tree: &'a SitemapTree,
        tags: &'a TagIndex,
        document: &'a RenderedDocument,
    ) -> Page<'a> {
        let nodes = tree.flatten_content_nodes();
        Page {
            document,
            tree,
            tag_index: tags,
            current: nodes[0],
            previous: None,
            next: Some(nodes[1]),
            breadcrumbs: tree.ancestors(nodes[0]),
            cache_id: "v1",
        }
    }

    #[test]
    fn test_template_precedence() {
        let tree = tree();
        let tags = tree.build_tag_index();

        let front_matter = document(PageMetadata {
            template: Some("front.html".to_owned()),
            ..PageMetadata::default()
        });
        assert_eq!(page(&tree, &tags, &front_matter).template("page.html"), "front.html");

        let from_node = document(PageMetadata::default());
        assert_eq!(page(&tree, &tags, &from_node).template("page.html"), "node.html");

        let mut default_page = page(&tree, &tags, &from_node);
        default_page.current = default_page.next.unwrap();
        assert_eq!(default_page.template("page.html"), "page.html");
    }

    #[test]
    fn test_title_falls_back_to_node_text() {
        let tree = tree();
        let tags = tree.build_tag_index();

        let untitled = document(PageMetadata::default());
        assert_eq!(page(&tree, &tags, &untitled).title(), "A");

        let titled = document(PageMetadata {
            title: "Alpha".to_owned(),
            ..PageMetadata::default()
        });
        assert_eq!(page(&tree, &tags, &titled).title(), "Alpha");
    }

    #[test]
    fn test_serialize_context() {
        let tree = tree();
        let tags = tree.build_tag_index();
        let doc = document(PageMetadata::default());
        let value = serde_json::to_value(page(&tree, &tags, &doc)).unwrap();

        assert_eq!(value["source"], "a.md");
        assert_eq!(value["href"], "/a");
        assert_eq!(value["title"], "A");
        assert_eq!(value["meta"]["toc"], -1);
        assert!(value["toc_tree"].is_null());
        assert!(value["previous"].is_null());
        assert_eq!(value["next"]["href"], "/b");
        assert_eq!(value["root"]["children"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["breadcrumbs"][0]["text"], "Home");
        assert_eq!(value["tags"]["guide"][0]["text"], "B");
        assert_eq!(value["cache_id"], "v1");
    }
}

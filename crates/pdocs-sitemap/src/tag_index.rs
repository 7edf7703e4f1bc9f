//! Tag index.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::tree::NodeId;

/// Mapping from tag to the sitemap nodes carrying it.
///
/// Entries are handles into the [`SitemapTree`](crate::SitemapTree) the index
/// was built from, in document order. Built by
/// [`SitemapTree::build_tag_index`](crate::SitemapTree::build_tag_index).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagIndex {
    tags: BTreeMap<String, Vec<NodeId>>,
}

impl TagIndex {
    pub(crate) fn insert(&mut self, tag: &str, id: NodeId) {
        self.tags.entry(tag.to_owned()).or_default().push(id);
    }

    /// Nodes tagged with `tag`; empty when the tag is unknown.
    #[must_use]
    pub fn get(&self, tag: &str) -> &[NodeId] {
        self.tags.get(tag).map_or(&[], Vec::as_slice)
    }

    /// Check if any node carries `tag`.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains_key(tag)
    }

    /// Tags with their nodes, sorted by tag.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[NodeId])> {
        self.tags
            .iter()
            .map(|(tag, ids)| (tag.as_str(), ids.as_slice()))
    }

    /// Number of distinct tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Check if no node is tagged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_order() {
        let mut index = TagIndex::default();
        index.insert("guide", NodeId::from_raw(3));
        index.insert("api", NodeId::from_raw(1));
        index.insert("guide", NodeId::from_raw(2));

        assert_eq!(index.get("guide"), &[NodeId::from_raw(3), NodeId::from_raw(2)]);
        assert_eq!(
            index.iter().map(|(tag, _)| tag).collect::<Vec<_>>(),
            vec!["api", "guide"]
        );
    }

    #[test]
    fn test_unknown_tag_is_empty() {
        let index = TagIndex::default();

        assert!(index.get("missing").is_empty());
        assert!(!index.contains("missing"));
        assert!(index.is_empty());
    }
}

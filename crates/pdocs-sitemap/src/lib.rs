//! Sitemap model for pdocs.
//!
//! The sitemap is the externally authored hierarchy that decides navigation
//! order, href assignment and tag cross-references. It goes through three
//! states:
//!
//! 1. [`SitemapEntry`] - the owned, deserializable input tree
//! 2. [`SitemapBuilder`] - a mutable arena where nodes can still be added
//! 3. [`SitemapTree`] - the annotated, read-only tree produced by
//!    [`SitemapBuilder::annotate`]
//!
//! Nodes are addressed by [`NodeId`] handles into the arena, so the
//! [`TagIndex`] and render contexts never own copies of nodes.
//!
//! # Example
//!
//! ```
//! use pdocs_sitemap::{SitemapBuilder, SitemapEntry};
//!
//! let root = SitemapEntry::new("Home")
//!     .with_child(SitemapEntry::new("Guide").with_href("/guide").with_tag("docs"))
//!     .with_child(SitemapEntry::new("FAQ"));
//!
//! let tree = SitemapBuilder::from_entry(&root).annotate();
//! let faq = tree.children(tree.root())[1];
//! assert_eq!(tree.node(faq).href, "#faq");
//!
//! let tags = tree.build_tag_index();
//! assert_eq!(tags.get("docs").len(), 1);
//! ```

mod entry;
mod href;
mod tag_index;
mod tree;
mod view;

pub use entry::SitemapEntry;
pub use href::resolve_href;
pub use tag_index::TagIndex;
pub use tree::{NodeId, NodeOrigin, SitemapBuilder, SitemapNode, SitemapTree};
pub use view::NodeView;

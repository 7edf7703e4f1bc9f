//! Markdown parsing and rendering for pdocs.
//!
//! This crate wraps `pulldown-cmark` with the three hooks the site generator
//! needs:
//! - [`MarkdownRenderer::parse`] captures the YAML front-matter block and
//!   assigns a stable anchor id to every heading
//! - [`synthesize`] builds a depth-limited [`Toc`] from those headings
//! - [`MarkdownRenderer::render`] serializes the (possibly transformed)
//!   [`Document`] to HTML
//!
//! # Example
//!
//! ```
//! use pdocs_renderer::{MarkdownRenderer, TocPolicy, render_list, synthesize};
//!
//! let renderer = MarkdownRenderer::new();
//! let doc = renderer.parse("---\ntitle: Intro\n---\n# Intro\n\n## Setup\n");
//! assert!(doc.metadata_block().unwrap().contains("title: Intro"));
//!
//! let toc = synthesize(doc.headings(), TocPolicy::Unlimited).unwrap().unwrap();
//! assert!(render_list(&toc).contains(r##"href="#setup""##));
//!
//! let html = renderer.render(&doc);
//! assert!(html.contains(r#"<h2 id="setup">"#));
//! ```

mod document;
mod renderer;
mod state;
mod toc;

pub use document::{Document, Heading};
pub use renderer::MarkdownRenderer;
pub use state::{escape_html, slugify};
pub use toc::{Toc, TocError, TocNode, TocPolicy, render_list, synthesize};

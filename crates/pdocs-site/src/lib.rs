//! Site generation for pdocs.
//!
//! This crate provides:
//! - [`PageMetadata`]: typed front matter coerced from the YAML block
//! - [`Page`]: the per-page render context handed to templates
//! - [`TemplateEngine`] and its `minijinja` implementation
//! - [`SiteGenerator`]: the load, annotate and generate pipeline
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use pdocs_site::{SiteConfig, SiteGenerator};
//! use pdocs_sitemap::SitemapEntry;
//! use pdocs_storage::FsStorage;
//!
//! let sitemap = SitemapEntry::new("Home")
//!     .with_child(SitemapEntry::new("Intro").with_href("/intro.html").with_page("intro.md"));
//!
//! let generator = SiteGenerator::new(SiteConfig::default(), Arc::new(FsStorage::new()));
//! let report = generator.generate(&sitemap)?;
//! println!("{} pages written", report.pages);
//! # Ok(())
//! # }
//! ```

mod front_matter;
mod generator;
mod output;
mod page;
mod templates;

pub use front_matter::{
    FrontMatter, FrontMatterValue, MetadataError, PageMetadata, parse_front_matter,
};
pub use generator::{GenerateError, GenerateReport, PlannedPage, Site, SiteConfig, SiteGenerator};
pub use page::{Page, RenderedDocument};
pub use templates::{MiniJinjaEngine, TemplateEngine, TemplateError};

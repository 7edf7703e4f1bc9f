//! Site generation pipeline.
//!
//! # Phases
//!
//! A run is all-or-nothing; the first error aborts it.
//!
//! 1. **Templates**: every file under the template directory is registered
//! 2. **Load**: each content node's markdown is read, its front matter
//!    coerced, its table of contents built and its body rendered
//! 3. **Graft**: table of contents entries become `heading` children of
//!    their page's sitemap node (when `toc_in_sitemap` is on)
//! 4. **Annotate**: hrefs are resolved, the tree is frozen and the tag
//!    index built
//! 5. **Plan**: output names are derived and checked for collisions before
//!    anything is written
//! 6. **Generate**: every page is rendered with its template; files are
//!    written only once all renders succeed
//!
//! Phases 2 and 6 run on the `rayon` thread pool when `parallel` is set.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pdocs_renderer::{MarkdownRenderer, Toc, TocError, TocNode, render_list, synthesize};
use pdocs_sitemap::{NodeId, SitemapBuilder, SitemapEntry, SitemapNode, SitemapTree, TagIndex};
use pdocs_storage::{Storage, StorageError};
use rayon::prelude::*;

use crate::front_matter::{MetadataError, PageMetadata};
use crate::output::output_path;
use crate::page::{Page, RenderedDocument};
use crate::templates::{MiniJinjaEngine, TemplateEngine, TemplateError};

/// Text of the permalink anchor appended to headings.
const HEADING_ANCHOR_TEXT: &str = "#";

/// Configuration for [`SiteGenerator`].
#[derive(Clone, Debug)]
pub struct SiteConfig {
    /// Base directory for sitemap page paths.
    pub source_dir: PathBuf,
    /// Directory holding the templates.
    pub template_dir: PathBuf,
    /// Directory receiving the generated HTML.
    pub output_dir: PathBuf,
    /// Template used when neither the page nor its node names one.
    pub default_template: String,
    /// Cache-busting id passed to every page.
    pub cache_id: String,
    /// Add table of contents entries to the sitemap.
    pub toc_in_sitemap: bool,
    /// Append permalink anchors to headings.
    pub heading_anchors: bool,
    /// Load and generate pages in parallel.
    pub parallel: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            template_dir: PathBuf::from("templates"),
            output_dir: PathBuf::from("public"),
            default_template: "page.html".to_owned(),
            cache_id: String::new(),
            toc_in_sitemap: true,
            heading_anchors: true,
            parallel: false,
        }
    }
}

/// Error raised by a generation run.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// Templates could not be loaded.
    #[error("failed to load templates")]
    Templates(#[from] TemplateError),
    /// A page source could not be read.
    #[error("failed to read page {}", path.display())]
    SourceRead {
        /// Page source.
        path: PathBuf,
        /// Underlying storage error.
        #[source]
        source: StorageError,
    },
    /// A page has invalid front matter.
    #[error("invalid front matter in {}", path.display())]
    Metadata {
        /// Page source.
        path: PathBuf,
        /// Coercion error.
        #[source]
        source: MetadataError,
    },
    /// A page's table of contents could not be built.
    #[error("failed to build table of contents for {}", path.display())]
    Toc {
        /// Page source.
        path: PathBuf,
        /// Synthesis error.
        #[source]
        source: TocError,
    },
    /// A template failed for a page.
    #[error("failed to render {} with template {template:?}", path.display())]
    Render {
        /// Page source.
        path: PathBuf,
        /// Template name.
        template: String,
        /// Template error.
        #[source]
        source: TemplateError,
    },
    /// A page's output name is empty or escapes the output directory.
    #[error("invalid output name {name:?} for {}", path.display())]
    InvalidOutputName {
        /// Page source.
        path: PathBuf,
        /// Offending name.
        name: String,
    },
    /// Two pages would write the same file.
    #[error(
        "{} and {} both generate {}",
        first.display(),
        second.display(),
        output.display()
    )]
    DuplicateOutput {
        /// Output path, relative to the output directory.
        output: PathBuf,
        /// Page that claimed the output first.
        first: PathBuf,
        /// Page that collided with it.
        second: PathBuf,
    },
    /// An output file could not be written.
    #[error("failed to write {}", path.display())]
    Write {
        /// Output file.
        path: PathBuf,
        /// Underlying storage error.
        #[source]
        source: StorageError,
    },
}

/// Summary of a generation run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerateReport {
    /// Number of pages generated.
    pub pages: usize,
    /// Written files, in site order.
    pub written: Vec<PathBuf>,
}

/// A loaded page and where it will be written.
#[derive(Clone, Debug)]
pub struct PlannedPage {
    /// Sitemap node of the page.
    pub node: NodeId,
    /// Loaded document.
    pub document: RenderedDocument,
    /// Output file, relative to the output directory.
    pub output: PathBuf,
}

/// A fully loaded site: annotated tree, tag index and planned pages.
///
/// Pages are in site order (pre-order over the sitemap), which is also the
/// previous/next order.
#[derive(Debug)]
pub struct Site {
    tree: SitemapTree,
    tag_index: TagIndex,
    pages: Vec<PlannedPage>,
}

impl Site {
    /// Annotated sitemap, including grafted heading nodes.
    #[must_use]
    pub fn tree(&self) -> &SitemapTree {
        &self.tree
    }

    /// Tag index of the tree.
    #[must_use]
    pub fn tag_index(&self) -> &TagIndex {
        &self.tag_index
    }

    /// Planned pages in site order.
    #[must_use]
    pub fn pages(&self) -> &[PlannedPage] {
        &self.pages
    }

    /// Render context for the page at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn page_context<'a>(&'a self, index: usize, cache_id: &'a str) -> Page<'a> {
        let planned = &self.pages[index];
        Page {
            document: &planned.document,
            tree: &self.tree,
            tag_index: &self.tag_index,
            current: planned.node,
            previous: index.checked_sub(1).map(|i| self.pages[i].node),
            next: self.pages.get(index + 1).map(|p| p.node),
            breadcrumbs: self.tree.ancestors(planned.node),
            cache_id,
        }
    }
}

/// Static site generator.
///
/// All file access goes through the [`Storage`] it was created with.
pub struct SiteGenerator {
    config: SiteConfig,
    storage: Arc<dyn Storage>,
    renderer: MarkdownRenderer,
}

impl SiteGenerator {
    /// Create a generator.
    #[must_use]
    pub fn new(config: SiteConfig, storage: Arc<dyn Storage>) -> Self {
        Self {
            config,
            storage,
            renderer: MarkdownRenderer::new(),
        }
    }

    /// Use a custom markdown renderer.
    #[must_use]
    pub fn with_renderer(mut self, renderer: MarkdownRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Generator configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Generate the site with templates from the configured directory.
    ///
    /// # Errors
    ///
    /// Returns the first [`GenerateError`] of the run; see the module docs
    /// for the phases.
    pub fn generate(&self, sitemap: &SitemapEntry) -> Result<GenerateReport, GenerateError> {
        let engine = MiniJinjaEngine::load(self.storage.as_ref(), &self.config.template_dir)?;
        self.generate_with(sitemap, &engine)
    }

    /// Generate the site with an already loaded template engine.
    ///
    /// # Errors
    ///
    /// Returns the first [`GenerateError`] of the run.
    pub fn generate_with(
        &self,
        sitemap: &SitemapEntry,
        engine: &dyn TemplateEngine,
    ) -> Result<GenerateReport, GenerateError> {
        let site = self.load(sitemap)?;
        self.write_site(&site, engine)
    }

    /// Load every page and annotate the sitemap, without writing anything.
    ///
    /// # Errors
    ///
    /// Returns the first load, front matter, TOC or output naming error.
    pub fn load(&self, sitemap: &SitemapEntry) -> Result<Site, GenerateError> {
        let mut builder = SitemapBuilder::from_entry(sitemap);
        let content: Vec<(NodeId, PathBuf)> = builder
            .content_nodes()
            .into_iter()
            .filter_map(|id| builder.node(id).page.clone().map(|page| (id, page)))
            .collect();

        let documents: Vec<RenderedDocument> = if self.config.parallel {
            content
                .par_iter()
                .map(|(_, page)| self.load_document(page))
                .collect::<Result<_, _>>()?
        } else {
            content
                .iter()
                .map(|(_, page)| self.load_document(page))
                .collect::<Result<_, _>>()?
        };

        if self.config.toc_in_sitemap {
            for ((node, _), document) in content.iter().zip(&documents) {
                if let Some(toc) = &document.toc {
                    graft_toc(&mut builder, *node, toc);
                }
            }
        }

        let tree = builder.annotate();
        let tag_index = tree.build_tag_index();
        let pages = plan_outputs(content.into_iter().map(|(id, _)| id), documents)?;

        tracing::info!(
            nodes = tree.len(),
            pages = pages.len(),
            tags = tag_index.len(),
            "Loaded site"
        );

        Ok(Site {
            tree,
            tag_index,
            pages,
        })
    }

    fn load_document(&self, page: &Path) -> Result<RenderedDocument, GenerateError> {
        let path = self.config.source_dir.join(page);
        let markdown = self
            .storage
            .read(&path)
            .map_err(|source| GenerateError::SourceRead {
                path: page.to_path_buf(),
                source,
            })?;

        let mut document = self.renderer.parse(&markdown);
        let metadata = PageMetadata::parse(document.metadata_block()).map_err(|source| {
            GenerateError::Metadata {
                path: page.to_path_buf(),
                source,
            }
        })?;

        let toc = synthesize(document.headings(), metadata.toc).map_err(|source| {
            GenerateError::Toc {
                path: page.to_path_buf(),
                source,
            }
        })?;
        if metadata.toc.is_enabled() && toc.is_none() {
            tracing::debug!(page = %page.display(), "Table of contents requested but page has no headings");
        }

        if self.config.heading_anchors {
            document.insert_heading_anchors(HEADING_ANCHOR_TEXT);
        }
        let html = self.renderer.render(&document);
        let toc_html = toc.as_ref().map(render_list);

        tracing::debug!(page = %page.display(), headings = document.headings().len(), "Loaded page");

        Ok(RenderedDocument {
            source: page.to_path_buf(),
            metadata,
            toc,
            html,
            toc_html,
        })
    }

    fn write_site(
        &self,
        site: &Site,
        engine: &dyn TemplateEngine,
    ) -> Result<GenerateReport, GenerateError> {
        let count = site.pages.len();
        let rendered: Vec<(PathBuf, String)> = if self.config.parallel {
            (0..count)
                .into_par_iter()
                .map(|index| self.render_page(site, index, engine))
                .collect::<Result<_, _>>()?
        } else {
            (0..count)
                .map(|index| self.render_page(site, index, engine))
                .collect::<Result<_, _>>()?
        };

        let mut written = Vec::with_capacity(rendered.len());
        for (path, html) in rendered {
            self.storage
                .write(&path, &html)
                .map_err(|source| GenerateError::Write {
                    path: path.clone(),
                    source,
                })?;
            tracing::debug!(path = %path.display(), bytes = html.len(), "Wrote page");
            written.push(path);
        }

        tracing::info!(
            pages = written.len(),
            output = %self.config.output_dir.display(),
            "Generated site"
        );

        Ok(GenerateReport {
            pages: written.len(),
            written,
        })
    }

    /// Render one planned page. Nothing is written here.
    fn render_page(
        &self,
        site: &Site,
        index: usize,
        engine: &dyn TemplateEngine,
    ) -> Result<(PathBuf, String), GenerateError> {
        let planned = &site.pages[index];
        let page = site.page_context(index, &self.config.cache_id);
        let template = page.template(&self.config.default_template).to_owned();

        let html = engine
            .render(&template, &page)
            .map_err(|source| GenerateError::Render {
                path: planned.document.source.clone(),
                template: template.clone(),
                source,
            })?;

        tracing::info!(
            page = %planned.document.source.display(),
            href = page.href(),
            template = %template,
            "Rendered page"
        );
        Ok((self.config.output_dir.join(&planned.output), html))
    }
}

/// Add a page's table of contents below its sitemap node.
///
/// Heading nodes are addressed as `page_href#anchor`.
fn graft_toc(builder: &mut SitemapBuilder, node: NodeId, toc: &Toc) {
    fn graft_items(builder: &mut SitemapBuilder, parent: NodeId, page_href: &str, items: &[TocNode]) {
        for item in items {
            let id = builder.add_node(
                parent,
                SitemapNode::heading(&item.title, format!("{page_href}#{}", item.id)),
            );
            graft_items(builder, id, page_href, &item.children);
        }
    }

    let page_href = builder.effective_href(node);
    graft_items(builder, node, &page_href, &toc.items);
}

/// Pair loaded documents with output paths, rejecting invalid and duplicate
/// names before anything is written.
fn plan_outputs(
    nodes: impl Iterator<Item = NodeId>,
    documents: Vec<RenderedDocument>,
) -> Result<Vec<PlannedPage>, GenerateError> {
    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
    let mut pages = Vec::with_capacity(documents.len());

    for (node, document) in nodes.zip(documents) {
        let slug = document.metadata.slug.as_deref();
        let Some(output) = output_path(slug, &document.source) else {
            return Err(GenerateError::InvalidOutputName {
                path: document.source.clone(),
                name: slug.map_or_else(|| document.source.display().to_string(), str::to_owned),
            });
        };

        if let Some(first) = claimed.get(&output) {
            return Err(GenerateError::DuplicateOutput {
                output,
                first: first.clone(),
                second: document.source.clone(),
            });
        }
        claimed.insert(output.clone(), document.source.clone());

        pages.push(PlannedPage {
            node,
            document,
            output,
        });
    }

    Ok(pages)
}

#[cfg(test)]
mod tests {
    use pdocs_storage::MockStorage;
    use pretty_assertions::assert_eq;

    use super::*;

    const PAGE_TEMPLATE: &str = "{{ page.title }}|{{ page.previous.text }}|{{ page.next.text }}";

    fn config() -> SiteConfig {
        SiteConfig {
            source_dir: PathBuf::from("docs"),
            template_dir: PathBuf::from("templates"),
            output_dir: PathBuf::from("public"),
            ..SiteConfig::default()
        }
    }

    fn sitemap() -> SitemapEntry {
        SitemapEntry::new("Home")
            .with_child(SitemapEntry::new("A").with_href("/a").with_page("a.md"))
            .with_child(
                SitemapEntry::new("B")
                    .with_href("/b")
                    .with_page("b.md")
                    .with_tag("guide"),
            )
    }

    fn storage() -> MockStorage {
        MockStorage::new()
            .with_file("templates/page.html", PAGE_TEMPLATE)
            .with_file("docs/a.md", "---\ntitle: Alpha\n---\n# Alpha\n")
            .with_file("docs/b.md", "---\ntitle: Beta\ntoc: 0\n---\n# Beta\n\n## Usage\n")
    }

    fn generator(storage: &Arc<MockStorage>, config: SiteConfig) -> SiteGenerator {
        SiteGenerator::new(config, Arc::clone(storage) as Arc<dyn Storage>)
    }

    #[test]
    fn test_generate_writes_pages_with_prev_next() {
        let storage = Arc::new(storage());

        let report = generator(&storage, config()).generate(&sitemap()).unwrap();

        assert_eq!(report.pages, 2);
        assert_eq!(
            report.written,
            vec![PathBuf::from("public/a.html"), PathBuf::from("public/b.html")]
        );
        assert_eq!(storage.content("public/a.html").as_deref(), Some("Alpha||B"));
        assert_eq!(storage.content("public/b.html").as_deref(), Some("Beta|A|"));
    }

    #[test]
    fn test_parallel_generation_matches_sequential() {
        let sequential = Arc::new(storage());
        let parallel = Arc::new(storage());

        let seq_report = generator(&sequential, config()).generate(&sitemap()).unwrap();
        let par_report = generator(
            &parallel,
            SiteConfig {
                parallel: true,
                ..config()
            },
        )
        .generate(&sitemap())
        .unwrap();

        assert_eq!(seq_report, par_report);
        for path in &seq_report.written {
            assert_eq!(sequential.content(path), parallel.content(path));
        }
    }

    #[test]
    fn test_load_grafts_toc_nodes() {
        let storage = Arc::new(storage());

        let site = generator(&storage, config()).load(&sitemap()).unwrap();
        let tree = site.tree();
        let b = site.pages()[1].node;
        let grafted: Vec<_> = tree
            .children(b)
            .iter()
            .map(|&id| (tree.node(id).text.clone(), tree.node(id).href.clone()))
            .collect();

        assert_eq!(
            grafted,
            vec![("Beta".to_owned(), "/b#beta".to_owned())]
        );
        let beta = tree.children(b)[0];
        assert_eq!(tree.node(tree.children(beta)[0]).href, "/b#usage");
        assert!(tree.node(beta).is_heading());
    }

    #[test]
    fn test_load_without_grafting() {
        let storage = Arc::new(storage());
        let config = SiteConfig {
            toc_in_sitemap: false,
            ..config()
        };

        let site = generator(&storage, config).load(&sitemap()).unwrap();

        assert!(site.tree().children(site.pages()[1].node).is_empty());
    }

    #[test]
    fn test_pages_follow_flattened_order() {
        let storage = Arc::new(storage());

        let site = generator(&storage, config()).load(&sitemap()).unwrap();
        let order: Vec<_> = site.pages().iter().map(|p| p.node).collect();

        assert_eq!(order, site.tree().flatten_content_nodes());
    }

    #[test]
    fn test_tag_index_after_load() {
        let storage = Arc::new(storage());

        let site = generator(&storage, config()).load(&sitemap()).unwrap();
        let guide = site.tag_index().get("guide");

        assert_eq!(guide.len(), 1);
        assert_eq!(site.tree().node(guide[0]).text, "B");
    }

    #[test]
    fn test_toc_and_anchors_rendered() {
        let storage = Arc::new(storage());

        let site = generator(&storage, config()).load(&sitemap()).unwrap();
        let b = &site.pages()[1].document;

        let toc_html = b.toc_html.as_deref().unwrap();
        assert!(toc_html.starts_with("<ul id=\"toc-list\">"));
        assert!(toc_html.contains("href=\"#usage\""));
        assert!(b.html.contains(r##"<a class="anchor" href="#usage">#</a>"##));
        assert!(site.pages()[0].document.toc_html.is_none());
    }

    #[test]
    fn test_heading_anchors_disabled() {
        let storage = Arc::new(storage());
        let config = SiteConfig {
            heading_anchors: false,
            ..config()
        };

        let site = generator(&storage, config).load(&sitemap()).unwrap();

        assert!(!site.pages()[1].document.html.contains("class=\"anchor\""));
    }

    #[test]
    fn test_missing_source_aborts() {
        let storage = Arc::new(MockStorage::new().with_file("templates/page.html", ""));

        let err = generator(&storage, config()).generate(&sitemap()).unwrap_err();

        match err {
            GenerateError::SourceRead { path, .. } => assert_eq!(path, PathBuf::from("a.md")),
            other => panic!("expected SourceRead, got {other:?}"),
        }
        assert!(storage.written().is_empty());
    }

    #[test]
    fn test_bad_front_matter_names_page() {
        let storage = Arc::new(storage().with_file("docs/b.md", "---\ntoc: \"yes\"\n---\n# B\n"));

        let err = generator(&storage, config()).generate(&sitemap()).unwrap_err();

        assert_eq!(err.to_string(), "invalid front matter in b.md");
        assert!(matches!(
            err,
            GenerateError::Metadata {
                source: MetadataError::Type { field: "toc", .. },
                ..
            }
        ));
        assert!(storage.written().is_empty());
    }

    #[test]
    fn test_duplicate_output_fails_before_writing() {
        let storage = Arc::new(storage().with_file("docs/b.md", "---\nslug: a\n---\n# B\n"));

        let err = generator(&storage, config()).generate(&sitemap()).unwrap_err();

        assert!(matches!(err, GenerateError::DuplicateOutput { .. }));
        assert!(storage.written().is_empty());
    }

    #[test]
    fn test_invalid_output_name() {
        let storage = Arc::new(storage().with_file("docs/b.md", "---\nslug: ../escape\n---\n"));

        let err = generator(&storage, config()).generate(&sitemap()).unwrap_err();

        assert!(matches!(err, GenerateError::InvalidOutputName { ref name, .. } if name == "../escape"));
    }

    #[test]
    fn test_slug_sets_output_name() {
        let storage = Arc::new(storage().with_file("docs/b.md", "---\nslug: beta\n---\n# B\n"));

        let report = generator(&storage, config()).generate(&sitemap()).unwrap();

        assert_eq!(report.written[1], PathBuf::from("public/beta.html"));
    }

    #[test]
    fn test_missing_template_is_render_error() {
        let storage = Arc::new(storage().with_file("docs/a.md", "---\ntemplate: wide.html\n---\n"));

        let err = generator(&storage, config()).generate(&sitemap()).unwrap_err();

        match err {
            GenerateError::Render { path, template, .. } => {
                assert_eq!(path, PathBuf::from("a.md"));
                assert_eq!(template, "wide.html");
            }
            other => panic!("expected Render, got {other:?}"),
        }
    }

    #[test]
    fn test_render_failure_on_last_page_writes_nothing() {
        for parallel in [false, true] {
            let storage = Arc::new(
                storage().with_file("docs/b.md", "---\ntemplate: missing.html\n---\n# Beta\n"),
            );
            let config = SiteConfig {
                parallel,
                ..config()
            };

            let err = generator(&storage, config).generate(&sitemap()).unwrap_err();

            assert!(
                matches!(err, GenerateError::Render { ref path, .. } if path == Path::new("b.md")),
                "parallel = {parallel}"
            );
            assert!(storage.written().is_empty(), "parallel = {parallel}");
        }
    }

    #[test]
    fn test_write_failure() {
        let storage = Arc::new(storage().with_read_only("public/b.html"));

        let err = generator(&storage, config()).generate(&sitemap()).unwrap_err();

        assert!(matches!(err, GenerateError::Write { ref path, .. } if path == Path::new("public/b.html")));
    }

    #[test]
    fn test_missing_template_dir() {
        let storage = Arc::new(MockStorage::new().with_file("docs/a.md", "# A"));

        let err = generator(&storage, config()).generate(&sitemap()).unwrap_err();

        assert!(matches!(err, GenerateError::Templates(TemplateError::Discovery { .. })));
    }

    #[test]
    fn test_navigation_only_sitemap_generates_nothing() {
        let storage = Arc::new(storage());
        let sitemap = SitemapEntry::new("Home").with_child(SitemapEntry::new("Group"));

        let report = generator(&storage, config()).generate(&sitemap).unwrap();

        assert_eq!(report, GenerateReport::default());
    }
}

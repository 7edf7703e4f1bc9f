//! Markdown parser and HTML renderer.

use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::document::{Document, Heading};
use crate::state::HeadingState;

/// Markdown renderer backed by `pulldown-cmark`.
///
/// Parsing and rendering are separate steps so callers can inspect the
/// heading outline and transform the [`Document`] in between.
#[derive(Clone, Debug)]
pub struct MarkdownRenderer {
    gfm: bool,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Start tag of the heading currently being collected.
struct PendingHeading {
    level: HeadingLevel,
    id: Option<CowStr<'static>>,
    classes: Vec<CowStr<'static>>,
    attrs: Vec<(CowStr<'static>, Option<CowStr<'static>>)>,
}

impl MarkdownRenderer {
    /// Create a new renderer with GFM enabled by default.
    #[must_use]
    pub fn new() -> Self {
        Self { gfm: true }
    }

    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// GFM is enabled by default. When enabled, the parser supports:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    /// - Footnotes
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Get parser options based on GFM configuration.
    ///
    /// Front-matter blocks and heading attributes are always recognized.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        let base = Options::ENABLE_YAML_STYLE_METADATA_BLOCKS | Options::ENABLE_HEADING_ATTRIBUTES;
        if self.gfm {
            base | Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_FOOTNOTES
                | Options::ENABLE_GFM
        } else {
            base
        }
    }

    /// Parse markdown into a [`Document`].
    ///
    /// The leading YAML block is captured verbatim (not rendered) and every
    /// heading is given an anchor id.
    #[must_use]
    pub fn parse(&self, markdown: &str) -> Document {
        let mut heading = HeadingState::default();
        let mut events: Vec<Event<'static>> = Vec::new();
        let mut headings = Vec::new();
        let mut metadata_block: Option<String> = None;
        let mut in_metadata = false;
        let mut collecting = false;
        let mut pending: Option<PendingHeading> = None;
        let mut heading_events: Vec<Event<'static>> = Vec::new();

        for event in Parser::new_ext(markdown, self.parser_options()) {
            match event {
                Event::Start(Tag::MetadataBlock(_)) => {
                    // Only the first block is front matter; later ones are dropped.
                    in_metadata = true;
                    collecting = metadata_block.is_none();
                    if collecting {
                        metadata_block = Some(String::new());
                    }
                }
                Event::End(TagEnd::MetadataBlock(_)) => {
                    in_metadata = false;
                    collecting = false;
                }
                Event::Text(text) if in_metadata => {
                    if let Some(block) = metadata_block.as_mut().filter(|_| collecting) {
                        block.push_str(&text);
                    }
                }
                Event::Start(Tag::Heading {
                    level,
                    id,
                    classes,
                    attrs,
                }) => {
                    heading.start_heading(level_number(level));
                    heading_events.clear();
                    pending = Some(PendingHeading {
                        level,
                        id: id.map(CowStr::into_static),
                        classes: classes.into_iter().map(CowStr::into_static).collect(),
                        attrs: attrs
                            .into_iter()
                            .map(|(key, value)| (key.into_static(), value.map(CowStr::into_static)))
                            .collect(),
                    });
                }
                Event::End(TagEnd::Heading(level)) => {
                    let Some(start) = pending.take() else {
                        continue;
                    };
                    let Some((num, title, id)) = heading.complete_heading(start.id.as_deref())
                    else {
                        continue;
                    };
                    events.push(Event::Start(Tag::Heading {
                        level: start.level,
                        id: Some(CowStr::from(id.clone())),
                        classes: start.classes,
                        attrs: start.attrs,
                    }));
                    events.append(&mut heading_events);
                    events.push(Event::End(TagEnd::Heading(level)));
                    headings.push(Heading {
                        level: num,
                        title,
                        id,
                    });
                }
                other if heading.is_active() => {
                    if let Event::Text(text) | Event::Code(text) = &other {
                        heading.push_text(text);
                    }
                    heading_events.push(other.into_static());
                }
                other => events.push(other.into_static()),
            }
        }

        Document::new(events, metadata_block, headings)
    }

    /// Render a document to HTML.
    #[must_use]
    pub fn render(&self, document: &Document) -> String {
        let mut html = String::with_capacity(4096);
        pulldown_cmark::html::push_html(&mut html, document.events().iter().cloned());
        html
    }

    /// Parse and render markdown in one step.
    #[must_use]
    pub fn render_markdown(&self, markdown: &str) -> String {
        self.render(&self.parse(markdown))
    }
}

fn level_number(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

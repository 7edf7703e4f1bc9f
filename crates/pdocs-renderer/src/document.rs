//! Parsed markdown document.

use pulldown_cmark::{CowStr, Event, Tag, TagEnd};

use crate::state::escape_html;

/// A heading found while parsing, with its resolved anchor id.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Heading {
    /// Heading level (1-6).
    pub level: u8,
    /// Heading plain text.
    pub title: String,
    /// Anchor ID for linking.
    pub id: String,
}

/// Intermediate representation of a parsed markdown document.
///
/// Holds the owned event stream (so it can be transformed before
/// rendering), the raw front-matter block and the heading outline.
#[derive(Clone, Debug, Default)]
pub struct Document {
    pub(crate) events: Vec<Event<'static>>,
    pub(crate) metadata_block: Option<String>,
    pub(crate) headings: Vec<Heading>,
    anchors_inserted: bool,
}

impl Document {
    pub(crate) fn new(
        events: Vec<Event<'static>>,
        metadata_block: Option<String>,
        headings: Vec<Heading>,
    ) -> Self {
        Self {
            events,
            metadata_block,
            headings,
            anchors_inserted: false,
        }
    }

    /// Raw YAML front-matter block, if the document starts with one.
    #[must_use]
    pub fn metadata_block(&self) -> Option<&str> {
        self.metadata_block.as_deref()
    }

    /// Headings in document order.
    #[must_use]
    pub fn headings(&self) -> &[Heading] {
        &self.headings
    }

    /// Parsed event stream.
    #[must_use]
    pub fn events(&self) -> &[Event<'static>] {
        &self.events
    }

    /// Append a permalink anchor (`<a class="anchor" href="#id">…</a>`) to
    /// every heading.
    ///
    /// Calling this more than once has no further effect.
    pub fn insert_heading_anchors(&mut self, text: &str) {
        if self.anchors_inserted {
            return;
        }
        self.anchors_inserted = true;

        let label = escape_html(text);
        let mut current_id: Option<String> = None;
        let mut events = Vec::with_capacity(self.events.len() + self.headings.len());

        for event in self.events.drain(..) {
            match &event {
                Event::Start(Tag::Heading { id, .. }) => {
                    current_id = id.as_ref().map(ToString::to_string);
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some(id) = current_id.take() {
                        let anchor = format!(
                            r##" <a class="anchor" href="#{}">{label}</a>"##,
                            escape_html(&id)
                        );
                        events.push(Event::InlineHtml(CowStr::from(anchor)));
                    }
                }
                _ => {}
            }
            events.push(event);
        }

        self.events = events;
    }
}

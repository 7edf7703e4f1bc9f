//! Front matter parsing and coercion.
//!
//! The YAML block at the top of a page is parsed into loosely typed
//! [`FrontMatterValue`]s first. [`PageMetadata::from_front_matter`] then
//! coerces each known field with an explicit rule, so type mismatches are
//! reported with the field name instead of surfacing later in templates.
//!
//! # Fields
//!
//! | Key           | Accepted                                   | Absent / null |
//! |---------------|--------------------------------------------|---------------|
//! | `title`       | string                                     | `""`          |
//! | `description` | string                                     | `""`          |
//! | `slug`        | string                                     | none          |
//! | `template`    | string                                     | none          |
//! | `keywords`    | list of strings, or whitespace-split string | `[]`          |
//! | `toc`         | bool or integer                            | disabled      |
//!
//! Unknown keys are ignored.

use std::collections::BTreeMap;

use pdocs_renderer::TocPolicy;
use serde::Serialize;

/// Loosely typed front matter value.
#[derive(Clone, Debug, PartialEq)]
pub enum FrontMatterValue {
    /// `~`, `null` or an empty value.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer that fits in `i64`.
    Integer(i64),
    /// Any other number.
    Float(f64),
    /// String.
    String(String),
    /// List.
    Sequence(Vec<FrontMatterValue>),
    /// Nested mapping.
    Mapping(FrontMatter),
}

/// Parsed front matter block, keyed by field name.
pub type FrontMatter = BTreeMap<String, FrontMatterValue>;

impl FrontMatterValue {
    /// Name of the value's type, used in error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
        }
    }
}

impl From<serde_yaml::Value> for FrontMatterValue {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value;

        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => n.as_f64().map_or(Self::Null, Self::Float),
            },
            Value::String(s) => Self::String(s),
            Value::Sequence(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::Mapping(mapping) => Self::Mapping(mapping_to_front_matter(mapping)),
            Value::Tagged(tagged) => Self::from(tagged.value),
        }
    }
}

/// Convert a YAML mapping, keeping keys that are scalars.
fn mapping_to_front_matter(mapping: serde_yaml::Mapping) -> FrontMatter {
    use serde_yaml::Value;

    mapping
        .into_iter()
        .filter_map(|(key, value)| {
            let key = match key {
                Value::String(s) => s,
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                _ => return None,
            };
            Some((key, FrontMatterValue::from(value)))
        })
        .collect()
}

/// Error raised when front matter can't be turned into [`PageMetadata`].
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// A known field has the wrong type.
    #[error("front matter field `{field}` must be {expected}, found {found}")]
    Type {
        /// Field name.
        field: &'static str,
        /// Accepted types.
        expected: &'static str,
        /// Type that was found.
        found: &'static str,
    },
    /// The block is not valid YAML.
    #[error("invalid front matter YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// The block is valid YAML but not a mapping.
    #[error("front matter must be a mapping, found {found}")]
    NotAMapping {
        /// Type of the top-level value.
        found: &'static str,
    },
}

/// Parse a raw YAML front matter block.
///
/// An empty block (or one holding only comments) yields an empty map.
pub fn parse_front_matter(block: &str) -> Result<FrontMatter, MetadataError> {
    if block.trim().is_empty() {
        return Ok(FrontMatter::new());
    }

    match FrontMatterValue::from(serde_yaml::from_str::<serde_yaml::Value>(block)?) {
        FrontMatterValue::Mapping(map) => Ok(map),
        FrontMatterValue::Null => Ok(FrontMatter::new()),
        other => Err(MetadataError::NotAMapping {
            found: other.type_name(),
        }),
    }
}

/// Typed page metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PageMetadata {
    /// Page title.
    pub title: String,
    /// Page description.
    pub description: String,
    /// Output name override. Never empty when set.
    pub slug: Option<String>,
    /// Keywords in source order.
    pub keywords: Vec<String>,
    /// Template override. Never empty when set.
    pub template: Option<String>,
    /// Table of contents policy.
    pub toc: TocPolicy,
}

impl PageMetadata {
    /// Parse and coerce an optional raw front matter block.
    ///
    /// A page without front matter gets default metadata.
    pub fn parse(block: Option<&str>) -> Result<Self, MetadataError> {
        match block {
            Some(block) => Self::from_front_matter(&parse_front_matter(block)?),
            None => Ok(Self::default()),
        }
    }

    /// Coerce parsed front matter field by field.
    pub fn from_front_matter(front_matter: &FrontMatter) -> Result<Self, MetadataError> {
        Ok(Self {
            title: coerce_string(front_matter, "title")?,
            description: coerce_string(front_matter, "description")?,
            slug: non_empty(coerce_string(front_matter, "slug")?),
            keywords: coerce_keywords(front_matter)?,
            template: non_empty(coerce_string(front_matter, "template")?),
            toc: coerce_toc(front_matter)?,
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

fn coerce_string(front_matter: &FrontMatter, field: &'static str) -> Result<String, MetadataError> {
    match front_matter.get(field) {
        None | Some(FrontMatterValue::Null) => Ok(String::new()),
        Some(FrontMatterValue::String(s)) => Ok(s.clone()),
        Some(other) => Err(MetadataError::Type {
            field,
            expected: "a string",
            found: other.type_name(),
        }),
    }
}

fn coerce_keywords(front_matter: &FrontMatter) -> Result<Vec<String>, MetadataError> {
    const FIELD: &str = "keywords";
    const EXPECTED: &str = "a string or a list of strings";

    match front_matter.get(FIELD) {
        None | Some(FrontMatterValue::Null) => Ok(Vec::new()),
        Some(FrontMatterValue::String(s)) => Ok(s.split_whitespace().map(str::to_owned).collect()),
        Some(FrontMatterValue::Sequence(items)) => items
            .iter()
            .map(|item| match item {
                FrontMatterValue::String(s) => Ok(s.clone()),
                other => Err(MetadataError::Type {
                    field: FIELD,
                    expected: EXPECTED,
                    found: other.type_name(),
                }),
            })
            .collect(),
        Some(other) => Err(MetadataError::Type {
            field: FIELD,
            expected: EXPECTED,
            found: other.type_name(),
        }),
    }
}

fn coerce_toc(front_matter: &FrontMatter) -> Result<TocPolicy, MetadataError> {
    match front_matter.get("toc") {
        None | Some(FrontMatterValue::Null | FrontMatterValue::Bool(false)) => {
            Ok(TocPolicy::Disabled)
        }
        Some(FrontMatterValue::Bool(true)) => Ok(TocPolicy::Unlimited),
        Some(FrontMatterValue::Integer(level)) => Ok(TocPolicy::from_level(*level)),
        Some(other) => Err(MetadataError::Type {
            field: "toc",
            expected: "a bool or an integer",
            found: other.type_name(),
        }),
    }
}

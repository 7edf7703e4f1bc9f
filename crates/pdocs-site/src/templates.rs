//! Template discovery and execution.

use std::path::{Component, Path, PathBuf};

use minijinja::{Environment, Value, context};
use pdocs_storage::{Storage, StorageError, StorageErrorKind};

use crate::page::Page;

/// Error raised while loading or executing templates.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// The template directory could not be listed.
    #[error("failed to discover templates in {}", path.display())]
    Discovery {
        /// Template directory.
        path: PathBuf,
        /// Underlying storage error.
        #[source]
        source: StorageError,
    },
    /// A template file could not be read.
    #[error("failed to read template {}", path.display())]
    Read {
        /// Template file.
        path: PathBuf,
        /// Underlying storage error.
        #[source]
        source: StorageError,
    },
    /// A template path can't be used as a template name.
    #[error("template path {} is not a valid template name", path.display())]
    InvalidName {
        /// Path relative to the template directory.
        path: PathBuf,
    },
    /// No template is registered under this name.
    #[error("template {name:?} not found")]
    NotFound {
        /// Requested template name.
        name: String,
    },
    /// Template syntax or execution error.
    #[error(transparent)]
    Engine(#[from] minijinja::Error),
}

/// Template execution capability.
///
/// Implementations must be shareable across threads for parallel generation.
pub trait TemplateEngine: Send + Sync {
    /// Check if a template with this name is registered.
    fn has_template(&self, name: &str) -> bool;

    /// Render a page with the named template.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] if the template is missing or fails.
    fn render(&self, name: &str, page: &Page<'_>) -> Result<String, TemplateError>;
}

/// [`TemplateEngine`] backed by `minijinja`.
///
/// Templates are registered under their path relative to the template
/// directory, with `/` separators (`page.html`, `partials/nav.html`), so
/// `{% extends %}` and `{% include %}` use the same names.
///
/// Templates see three variables:
/// - `page`: the serialized [`Page`]
/// - `content`: the rendered page body (safe HTML)
/// - `toc`: the rendered table of contents list (safe HTML), or none
pub struct MiniJinjaEngine {
    env: Environment<'static>,
    names: Vec<String>,
}

impl std::fmt::Debug for MiniJinjaEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiniJinjaEngine")
            .field("names", &self.names)
            .finish_non_exhaustive()
    }
}

impl Default for MiniJinjaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MiniJinjaEngine {
    /// Create an engine with no templates.
    #[must_use]
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
            names: Vec::new(),
        }
    }

    /// Register every file below `root` as a template.
    ///
    /// Files that are not UTF-8 text (images, fonts) are skipped with a
    /// warning.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] if the directory can't be listed, a file
    /// can't be read, or a template fails to compile.
    pub fn load(storage: &dyn Storage, root: &Path) -> Result<Self, TemplateError> {
        let files = storage
            .list_files(root)
            .map_err(|source| TemplateError::Discovery {
                path: root.to_path_buf(),
                source,
            })?;

        let mut engine = Self::new();
        for relative in files {
            let name = template_name(&relative)?;
            let path = root.join(&relative);
            let source = match storage.read(&path) {
                Ok(source) => source,
                Err(err) if err.kind == StorageErrorKind::InvalidData => {
                    tracing::warn!(path = %path.display(), "Skipping non-text file in template directory");
                    continue;
                }
                Err(source) => return Err(TemplateError::Read { path, source }),
            };
            engine.add_template(name.clone(), source)?;
            tracing::debug!(template = %name, "Loaded template");
        }

        tracing::info!(count = engine.names.len(), dir = %root.display(), "Discovered templates");
        Ok(engine)
    }

    /// Register a template from source.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Engine`] if the template fails to compile.
    pub fn add_template(
        &mut self,
        name: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<(), TemplateError> {
        let name = name.into();
        self.env.add_template_owned(name.clone(), source.into())?;
        if !self.names.contains(&name) {
            self.names.push(name);
        }
        Ok(())
    }

    /// Registered template names in registration order.
    #[must_use]
    pub fn template_names(&self) -> &[String] {
        &self.names
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn has_template(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    fn render(&self, name: &str, page: &Page<'_>) -> Result<String, TemplateError> {
        if !self.has_template(name) {
            return Err(TemplateError::NotFound {
                name: name.to_owned(),
            });
        }
        let template = self.env.get_template(name)?;
        let toc = page
            .document
            .toc_html
            .clone()
            .map_or(Value::from(()), Value::from_safe_string);
        let html = template.render(context! {
            page => Value::from_serialize(page),
            content => Value::from_safe_string(page.document.html.clone()),
            toc => toc,
        })?;
        Ok(html)
    }
}

/// Template name for a path relative to the template directory.
fn template_name(relative: &Path) -> Result<String, TemplateError> {
    let invalid = || TemplateError::InvalidName {
        path: relative.to_path_buf(),
    };

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str().ok_or_else(invalid)?),
            _ => return Err(invalid()),
        }
    }
    if parts.is_empty() {
        return Err(invalid());
    }
    Ok(parts.join("/"))
}

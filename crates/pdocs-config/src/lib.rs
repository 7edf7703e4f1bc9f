//! `pdocs.toml` loading.
//!
//! The file has two tables: `[site]` with generator settings and
//! `[sitemap]` with the root [`SitemapEntry`]. Without an explicit path the
//! file is looked up in the working directory, then in each parent.
//!
//! ```toml
//! [site]
//! source_dir = "docs"
//! output_dir = "${OUT_DIR:-public}"
//!
//! [sitemap]
//! text = "Home"
//!
//! [[sitemap.children]]
//! text = "Intro"
//! href = "/intro.html"
//! page = "intro.md"
//! ```
//!
//! `site.source_dir`, `site.template_dir`, `site.output_dir` and
//! `site.cache_id` may reference environment variables as `${VAR}` (must be
//! set) or `${VAR:-fallback}`. Relative directories are taken from the
//! directory holding the config file, after expansion.
//!
//! Command line values ([`CliSettings`]) are applied last.

mod expand;

use std::path::{Path, PathBuf};

use pdocs_sitemap::SitemapEntry;
use serde::Deserialize;

const CONFIG_FILENAME: &str = "pdocs.toml";

/// Values given on the command line; `Some` wins over the file.
#[derive(Debug, Default)]
pub struct CliSettings {
    pub source_dir: Option<PathBuf>,
    pub template_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub parallel: Option<bool>,
}

/// A loaded configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(rename = "site")]
    raw_site: RawSite,
    /// Root of the authored sitemap.
    pub sitemap: SitemapEntry,

    /// Site settings with expanded values and absolute directories.
    #[serde(skip)]
    pub site: SiteSettings,
    /// File the configuration came from, if any.
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// `[site]` exactly as written.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawSite {
    source_dir: Option<String>,
    template_dir: Option<String>,
    output_dir: Option<String>,
    default_template: Option<String>,
    cache_id: Option<String>,
    toc_in_sitemap: Option<bool>,
    heading_anchors: Option<bool>,
    parallel: Option<bool>,
}

/// Generator settings after expansion and path resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteSettings {
    /// Base directory for sitemap page paths.
    pub source_dir: PathBuf,
    pub template_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Template for pages that name none.
    pub default_template: String,
    pub cache_id: String,
    /// Graft each page's table of contents into the sitemap.
    pub toc_in_sitemap: bool,
    /// Append permalink anchors to headings.
    pub heading_anchors: bool,
    pub parallel: bool,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self::rooted_at(Path::new("."))
    }
}

impl SiteSettings {
    /// Defaults with directories under `base`.
    fn rooted_at(base: &Path) -> Self {
        Self {
            source_dir: base.to_path_buf(),
            template_dir: base.join("templates"),
            output_dir: base.join("public"),
            default_template: "page.html".to_owned(),
            cache_id: String::new(),
            toc_in_sitemap: true,
            heading_anchors: true,
            parallel: false,
        }
    }
}

/// Error loading a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An explicitly given config file does not exist.
    #[error("config file {} does not exist", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value parsed but is not acceptable.
    #[error("invalid config: {0}")]
    Validation(String),
    /// A `${VAR}` reference could not be expanded.
    #[error("cannot expand {field}: {message}")]
    EnvVar {
        /// Dotted field name, e.g. `site.output_dir`.
        field: String,
        message: String,
    },
}

impl Config {
    /// Load `config_path`, or the nearest `pdocs.toml`, or fall back to
    /// defaults rooted at the working directory. `cli` is applied last.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] for a missing explicit path, and
    /// read, parse, expansion or validation errors for the chosen file.
    pub fn load(config_path: Option<&Path>, cli: Option<&CliSettings>) -> Result<Self, ConfigError> {
        let path = match config_path {
            Some(path) if !path.is_file() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => std::env::current_dir()
                .ok()
                .and_then(|cwd| Self::discover(&cwd)),
        };

        let mut config = match path {
            Some(path) => Self::read(&path)?,
            None => {
                let cwd = std::env::current_dir().unwrap_or_default();
                Self::rooted_at(&cwd)
            }
        };

        if let Some(cli) = cli {
            config.override_with(cli);
        }
        Ok(config)
    }

    /// Parse a configuration, resolving relative directories against
    /// `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns parse, expansion or validation errors.
    pub fn from_toml(content: &str, base_dir: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.site = config.raw_site.resolve(base_dir)?;
        config.validate()?;
        Ok(config)
    }

    /// Find `pdocs.toml` in `start` or the closest parent.
    pub fn discover(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILENAME))
            .find(|candidate| candidate.is_file())
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for an empty default template or
    /// a sitemap root with a page.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.default_template.is_empty() {
            return Err(ConfigError::Validation(
                "site.default_template must not be empty".to_owned(),
            ));
        }
        if self.sitemap.page.is_some() {
            return Err(ConfigError::Validation(
                "the sitemap root is a navigation node and cannot have a page".to_owned(),
            ));
        }
        Ok(())
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let base_dir = path.parent().unwrap_or(Path::new("."));
        let mut config = Self::from_toml(&content, base_dir)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn rooted_at(base: &Path) -> Self {
        Self {
            site: SiteSettings::rooted_at(base),
            ..Self::default()
        }
    }

    fn override_with(&mut self, cli: &CliSettings) {
        let site = &mut self.site;
        for (value, target) in [
            (&cli.source_dir, &mut site.source_dir),
            (&cli.template_dir, &mut site.template_dir),
            (&cli.output_dir, &mut site.output_dir),
        ] {
            if let Some(value) = value {
                target.clone_from(value);
            }
        }
        if let Some(parallel) = cli.parallel {
            site.parallel = parallel;
        }
    }
}

impl RawSite {
    fn resolve(&self, base_dir: &Path) -> Result<SiteSettings, ConfigError> {
        let defaults = SiteSettings::rooted_at(base_dir);
        let dir = |value: &Option<String>, field: &str, default: PathBuf| {
            value.as_deref().map_or(Ok(default), |raw| {
                expand::expand_env(raw, field).map(|expanded| base_dir.join(expanded))
            })
        };

        Ok(SiteSettings {
            source_dir: dir(&self.source_dir, "site.source_dir", defaults.source_dir)?,
            template_dir: dir(&self.template_dir, "site.template_dir", defaults.template_dir)?,
            output_dir: dir(&self.output_dir, "site.output_dir", defaults.output_dir)?,
            default_template: self
                .default_template
                .clone()
                .unwrap_or(defaults.default_template),
            cache_id: match &self.cache_id {
                Some(raw) => expand::expand_env(raw, "site.cache_id")?,
                None => defaults.cache_id,
            },
            toc_in_sitemap: self.toc_in_sitemap.unwrap_or(defaults.toc_in_sitemap),
            heading_anchors: self.heading_anchors.unwrap_or(defaults.heading_anchors),
            parallel: self.parallel.unwrap_or(defaults.parallel),
        })
    }
}

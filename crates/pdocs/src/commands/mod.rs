//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod sitemap;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use pdocs_config::{CliSettings, Config, SiteSettings};
use pdocs_site::{SiteConfig, SiteGenerator};
use pdocs_storage::FsStorage;

use crate::error::CliError;

pub(crate) use build::BuildArgs;
pub(crate) use sitemap::SitemapArgs;

/// Arguments shared by every command.
#[derive(Args)]
pub(crate) struct CommonArgs {
    /// Path to configuration file (default: auto-discover pdocs.toml).
    #[arg(short, long, env = "PDOCS_CONFIG")]
    config: Option<PathBuf>,

    /// Markdown source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Template directory (overrides config).
    #[arg(short, long)]
    template_dir: Option<PathBuf>,

    /// Enable verbose output (log every loaded and written page).
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommonArgs {
    /// Load the configuration with these arguments applied.
    fn load_config(&self, mut settings: CliSettings) -> Result<Config, CliError> {
        settings.source_dir.clone_from(&self.source_dir);
        settings.template_dir.clone_from(&self.template_dir);
        Ok(Config::load(self.config.as_deref(), Some(&settings))?)
    }
}

/// Generator for a loaded configuration, backed by the local filesystem.
fn site_generator(settings: &SiteSettings) -> SiteGenerator {
    let config = SiteConfig {
        source_dir: settings.source_dir.clone(),
        template_dir: settings.template_dir.clone(),
        output_dir: settings.output_dir.clone(),
        default_template: settings.default_template.clone(),
        cache_id: settings.cache_id.clone(),
        toc_in_sitemap: settings.toc_in_sitemap,
        heading_anchors: settings.heading_anchors,
        parallel: settings.parallel,
    };
    SiteGenerator::new(config, Arc::new(FsStorage::new()))
}

//! `pdocs build` command implementation.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use pdocs_config::CliSettings;

use super::{CommonArgs, site_generator};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Output directory for the generated site (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Render pages in parallel.
    #[arg(long)]
    parallel: bool,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or generation fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.common.load_config(CliSettings {
            output_dir: self.output_dir,
            parallel: self.parallel.then_some(true),
            ..CliSettings::default()
        })?;
        let settings = &config.site;

        if let Some(path) = &config.config_path {
            output.field("Config", path.display());
        }
        output.field("Source", settings.source_dir.display());
        output.field("Templates", settings.template_dir.display());
        output.field("Output", settings.output_dir.display());
        tracing::debug!(
            default_template = %settings.default_template,
            cache_id = %settings.cache_id,
            toc_in_sitemap = settings.toc_in_sitemap,
            heading_anchors = settings.heading_anchors,
            parallel = settings.parallel,
            "Resolved site settings"
        );

        let started = Instant::now();
        let report = site_generator(settings).generate(&config.sitemap)?;

        output.done(&format!(
            "Generated {} page(s) in {:.2?}",
            report.pages,
            started.elapsed()
        ));
        Ok(())
    }
}

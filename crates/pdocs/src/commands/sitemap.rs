//! `pdocs sitemap` command implementation.

use clap::Args;
use console::Term;
use pdocs_config::CliSettings;
use pdocs_sitemap::NodeView;
use serde::Serialize;

use super::{CommonArgs, site_generator};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the sitemap command.
#[derive(Args)]
pub(crate) struct SitemapArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Print compact JSON instead of pretty-printed.
    #[arg(long)]
    compact: bool,
}

/// JSON document printed by the command.
#[derive(Serialize)]
struct SitemapDump<'a> {
    root: NodeView<'a>,
    tags: std::collections::BTreeMap<String, Vec<NodeView<'a>>>,
}

impl SitemapArgs {
    /// Execute the sitemap command.
    ///
    /// Pages are loaded (so TOC headings are grafted) but nothing is written.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or loading fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.common.load_config(CliSettings::default())?;

        tracing::debug!(source = %config.site.source_dir.display(), "Loading sitemap pages");
        let site = site_generator(&config.site).load(&config.sitemap)?;
        let tree = site.tree();
        let dump = SitemapDump {
            root: NodeView::deep(tree, tree.root()),
            tags: NodeView::tag_index(tree, site.tag_index()),
        };

        let json = if self.compact {
            serde_json::to_string(&dump)?
        } else {
            serde_json::to_string_pretty(&dump)?
        };
        Term::stdout().write_line(&json)?;

        output.summary(&format!(
            "{} node(s), {} page(s), {} tag(s)",
            tree.len(),
            site.pages().len(),
            site.tag_index().len()
        ));
        Ok(())
    }
}

//! pdocs CLI - static documentation site generator.
//!
//! Provides commands for:
//! - `build`: Generate the site into the output directory
//! - `sitemap`: Print the annotated sitemap and tag index as JSON

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, SitemapArgs};
use output::Output;

/// pdocs - static documentation site generator.
#[derive(Parser)]
#[command(name = "pdocs", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the site.
    Build(BuildArgs),
    /// Print the annotated sitemap as JSON.
    Sitemap(SitemapArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = match &cli.command {
        Commands::Build(args) => args.common.verbose,
        Commands::Sitemap(args) => args.common.verbose,
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose))
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(),
        Commands::Sitemap(args) => args.execute(),
    };

    if let Err(err) = result {
        output.failed(&err);
        std::process::exit(1);
    }
}

/// `--verbose` enables INFO level, otherwise use `RUST_LOG` or default to WARN.
fn log_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_log_filter_levels() {
        // SAFETY: no other test in this crate reads RUST_LOG
        unsafe {
            std::env::remove_var("RUST_LOG");
        }

        assert_eq!(log_filter(true).to_string(), "info");
        assert_eq!(log_filter(false).to_string(), "warn");
    }
}

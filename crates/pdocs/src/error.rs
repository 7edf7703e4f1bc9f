//! CLI error types.

use pdocs_config::ConfigError;
use pdocs_site::GenerateError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{}", render_chain(.0))]
    Generate(#[from] GenerateError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

/// Render an error with its source chain, `outer: inner: innermost`.
fn render_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

//! Status lines for the terminal.

use std::fmt::Display;

use console::{Style, Term};

/// Status writer on stderr; stdout is left to command output.
pub(crate) struct Output {
    term: Term,
    label: Style,
    done: Style,
    failed: Style,
    summary: Style,
}

impl Output {
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            label: Style::new().dim(),
            done: Style::new().green(),
            failed: Style::new().red().bold(),
            summary: Style::new().cyan(),
        }
    }

    /// `label: value`, with a dimmed label.
    pub(crate) fn field(&self, label: &str, value: impl Display) {
        self.line(&format!("{} {value}", self.label.apply_to(format!("{label}:"))));
    }

    pub(crate) fn done(&self, msg: &str) {
        self.line(&self.done.apply_to(msg).to_string());
    }

    pub(crate) fn failed(&self, err: &dyn Display) {
        self.line(&self.failed.apply_to(format!("error: {err}")).to_string());
    }

    pub(crate) fn summary(&self, msg: &str) {
        self.line(&self.summary.apply_to(msg).to_string());
    }

    fn line(&self, text: &str) {
        // Nothing useful to do if stderr is gone.
        let _ = self.term.write_line(text);
    }
}

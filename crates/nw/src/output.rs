//! Styled terminal output on stderr.

use console::{Style, Term};

/// Separator width used when the terminal size is unknown.
const DEFAULT_WIDTH: usize = 60;

/// Terminal output formatter.
pub(crate) struct Output {
    term: Term,
    dim: Style,
    green: Style,
    yellow: Style,
    red: Style,
    cyan_bold: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            dim: Style::new().dim(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            cyan_bold: Style::new().cyan().bold(),
        }
    }

    fn line(&self, style: Option<&Style>, msg: &str) {
        let _ = match style {
            Some(style) => self.term.write_line(&style.apply_to(msg).to_string()),
            None => self.term.write_line(msg),
        };
    }

    /// Plain message.
    pub(crate) fn info(&self, msg: &str) {
        self.line(None, msg);
    }

    /// Labelled value with a dimmed label.
    pub(crate) fn field(&self, label: &str, value: &str) {
        self.line(None, &format!("{} {value}", self.dim.apply_to(format!("{label}:"))));
    }

    /// Green message.
    pub(crate) fn success(&self, msg: &str) {
        self.line(Some(&self.green), msg);
    }

    /// Yellow message.
    pub(crate) fn warning(&self, msg: &str) {
        self.line(Some(&self.yellow), msg);
    }

    /// Red message.
    pub(crate) fn error(&self, msg: &str) {
        self.line(Some(&self.red), msg);
    }

    /// Cyan bold heading.
    pub(crate) fn highlight(&self, msg: &str) {
        self.line(Some(&self.cyan_bold), msg);
    }

    /// Dimmed rule across the terminal width.
    pub(crate) fn separator(&self) {
        let width = self
            .term
            .size_checked()
            .map_or(DEFAULT_WIDTH, |(_, cols)| usize::from(cols).min(DEFAULT_WIDTH));
        self.line(Some(&self.dim), &"-".repeat(width));
    }
}

use snafu::Snafu;

/// A recoverable problem met while replaying a log. The offending record is
/// skipped and the replay carries on.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum Diagnostic {
    #[snafu(display("line {line_number}: unrecognised record '{line}'"))]
    MalformedLine { line_number: usize, line: String },
    #[snafu(display("line {line_number}: already at the root, cannot move up"))]
    NavigateUpFromRoot { line_number: usize },
    #[snafu(display("line {line_number}: cannot navigate into file {path}"))]
    NavigateIntoFile { line_number: usize, path: String },
    #[snafu(display("line {line_number}: '{name}' already exists in {directory}"))]
    NameConflict {
        line_number: usize,
        name: String,
        directory: String,
    },
}

impl Diagnostic {
    pub fn line_number(&self) -> usize {
        match self {
            Diagnostic::MalformedLine { line_number, .. }
            | Diagnostic::NavigateUpFromRoot { line_number }
            | Diagnostic::NavigateIntoFile { line_number, .. }
            | Diagnostic::NameConflict { line_number, .. } => *line_number,
        }
    }

    /// Navigation problems leave the focused directory unchanged.
    pub fn is_navigation_error(&self) -> bool {
        matches!(
            self,
            Diagnostic::NavigateUpFromRoot { .. } | Diagnostic::NavigateIntoFile { .. }
        )
    }
}

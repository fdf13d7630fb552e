use std::fmt::{Display, Formatter};

use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::DiagnosticLevel;

/// A [`Location`] points at a slice of a single line of amod source.
///
/// Lines and columns are 1-based, `column_end` is exclusive. A location with
/// `column_start == column_end` marks a single position (e.g. where a syntax error was detected).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Location {
    /// The line number inside the source.
    pub line: usize,
    /// The column of the first character of the location.
    pub column_start: usize,
    /// The column just after the last character of the location.
    pub column_end: usize,
}

impl Location {
    /// Create a new [`Location`] covering `column_start..column_end` of `line`.
    pub fn new(line: usize, column_start: usize, column_end: usize) -> Self {
        Self {
            line,
            column_start,
            column_end: column_end.max(column_start),
        }
    }

    /// Create a zero-width [`Location`] at the given position.
    pub fn point(line: usize, column: usize) -> Self {
        Self::new(line, column, column)
    }

    /// Number of characters covered by this location.
    pub fn len(&self) -> usize {
        self.column_end - self.column_start
    }

    /// Whether this location marks a single position.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Obtain a string (with colors) showing the line of `source` this location refers to, with
    /// the covered characters underlined. Returns `None` if the line does not exist in `source`.
    pub fn snippet(&self, source: &str, level: DiagnosticLevel) -> Option<String> {
        let line = source.lines().nth(self.line.checked_sub(1)?)?;
        let mut result = String::new();

        let line_number = self.line.to_string();
        result += &format!("{} | {}\n", line_number, line);

        let pad = line_number.len() + 3 + self.column_start.saturating_sub(1);
        result += &" ".repeat(pad);

        let color = level.color();
        for _ in 0..(self.len().max(1)) {
            result += &format!("{}", "^".color(color).bold());
        }
        result += "\n";
        Some(result)
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column_start)
    }
}

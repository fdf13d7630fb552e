//! Diagnostics produced while compiling amod source.
//!
//! Every stage of the compiler appends to a [`DiagnosticLog`] instead of stopping at the first
//! problem, so that a single compilation reports every issue found in the model. A compilation
//! fails if and only if the log contains at least one error; warnings are advisory.

mod location;

use std::fmt::{Display, Formatter};

use colored::{Color, Colorize};
use serde::{Deserialize, Serialize};

pub use location::Location;

/// Prefix of the message of the diagnostics that signal a defect in the compiler itself.
pub const INTERNAL_PREFIX: &str = "INTERNAL: ";

#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum DiagnosticLevel {
    Warning,
    Error,
}

impl DiagnosticLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticLevel::Error => "Error",
            DiagnosticLevel::Warning => "Warning",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            DiagnosticLevel::Warning => Color::BrightYellow,
            DiagnosticLevel::Error => Color::BrightRed,
        }
    }
}

impl Display for DiagnosticLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    level: DiagnosticLevel,
    message: String,
    location: Option<Location>,
    internal: bool,
    note: Option<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            message: message.into(),
            location: None,
            internal: false,
            note: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            message: message.into(),
            location: None,
            internal: false,
            note: None,
        }
    }

    /// An error caused by a defect of the compiler rather than by the model being compiled.
    pub fn internal(message: impl AsRef<str>) -> Self {
        Self {
            internal: true,
            ..Self::error(format!("{}{}", INTERNAL_PREFIX, message.as_ref()))
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Print this diagnostic, if `source` is provided the offending line is shown as well.
    pub fn print(&self, f: &mut Formatter<'_>, source: Option<&str>) -> std::fmt::Result {
        let level = self.level.as_str();
        let pad = level.len();
        write!(f, "{}", level.color(self.level.color()).bold())?;
        if let Some(location) = &self.location {
            write!(f, " (line {})", location.line)?;
        }
        writeln!(f, ": {}", self.message)?;
        if let Some(note) = &self.note {
            write!(f, "{:>pad$}: ", "Note".bold(), pad = pad)?;
            let mut lines = note.lines();
            if let Some(line) = lines.next() {
                writeln!(f, "{}", line)?;
            }
            for line in lines {
                writeln!(f, "{:>pad$}  {}", "", line, pad = pad)?;
            }
        }
        if let (Some(location), Some(source)) = (&self.location, source) {
            if let Some(snippet) = location.snippet(source, self.level) {
                for line in snippet.lines() {
                    writeln!(f, "{:>pad$} {}", "", line, pad = pad + 1)?;
                }
            }
        }
        Ok(())
    }

    pub fn level(&self) -> DiagnosticLevel {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn location(&self) -> Option<Location> {
        self.location
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn is_error(&self) -> bool {
        self.level == DiagnosticLevel::Error
    }

    pub fn is_internal(&self) -> bool {
        self.internal
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.print(f, None)
    }
}

/// Ordered, append-only collection of the diagnostics of one compilation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DiagnosticLog {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Append an error, optionally pointing at the source.
    pub fn error(&mut self, location: Option<Location>, message: impl Into<String>) {
        self.add_diagnostic(with_optional_location(Diagnostic::error(message), location));
    }

    /// Append a warning, optionally pointing at the source.
    pub fn warning(&mut self, location: Option<Location>, message: impl Into<String>) {
        self.add_diagnostic(with_optional_location(Diagnostic::warning(message), location));
    }

    /// Append an error signalling a defect of the compiler.
    pub fn internal_error(&mut self, location: Option<Location>, message: impl AsRef<str>) {
        self.add_diagnostic(with_optional_location(
            Diagnostic::internal(message),
            location,
        ));
    }

    /// Whether the compilation must fail.
    pub fn has_error(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// The first diagnostic appended, if any.
    pub fn first_entry(&self) -> Option<&Diagnostic> {
        self.diagnostics.first()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Render all the diagnostics for the terminal, showing the offending lines of `source`.
    pub fn render(&self, file_name: &str, source: &str) -> String {
        let mut result = String::new();
        for diagnostic in &self.diagnostics {
            result += &format!(
                "{}{}",
                file_name.bold(),
                DisplayWithSource(diagnostic, source)
            );
        }
        result
    }
}

fn with_optional_location(diagnostic: Diagnostic, location: Option<Location>) -> Diagnostic {
    match location {
        Some(location) => diagnostic.with_location(location),
        None => diagnostic,
    }
}

struct DisplayWithSource<'a>(&'a Diagnostic, &'a str);

impl Display for DisplayWithSource<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(": ")?;
        self.0.print(f, Some(self.1))
    }
}

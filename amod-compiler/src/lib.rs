//! Front end of the amod modelling language.
//!
//! The source of a model is parsed into a concrete syntax tree (see [`cst`]), which is then
//! checked and translated into an [`amod_actr::Model`]. The problems found along the way are
//! collected in a [`DiagnosticLog`]: a syntax error stops the compilation immediately, every other
//! error is recorded and the compilation goes on, so that a single run reports all of them.
//!
//! ```
//! use amod_compiler::{generate_model, CompileOptions};
//!
//! let source = "
//! ==model==
//! name: count
//! ==config==
//! chunks { [counter: value] }
//! ==productions==
//! start { match { goal [counter: ?v] } do { print ?v } }
//! ";
//! let compilation = generate_model(source, &CompileOptions::default());
//! let model = compilation.model.unwrap();
//! assert_eq!(model.productions().len(), 1);
//! ```

#[macro_use]
extern crate log;
#[macro_use]
extern crate pest_derive;

use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;

use amod_actr::{Model, Pattern};
use amod_diagnostics::DiagnosticLog;

use crate::builder::ModelBuilder;
pub use crate::parser::{parse_file, ParseError, GRAMMAR};
use crate::resolve::resolve_pattern;

mod builder;
pub mod cst;
mod parser;
mod production;
mod resolve;

/// Options of a compilation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Emit the syntax tree of the source in the debug logs.
    pub debug: bool,
}

/// Why a compilation did not produce a model. The details are in the [`DiagnosticLog`] of the
/// compilation.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The source is not syntactically valid.
    #[error("syntax error in the model")]
    Parse,
    /// The source is valid, but the model it describes is not.
    #[error("the model has errors")]
    Compile,
    /// The source file cannot be read.
    #[error("cannot read the model file: {0}")]
    Io(#[from] std::io::Error),
}

/// The outcome of a compilation: the model (if it's valid) and the diagnostics, warnings
/// included.
#[derive(Debug)]
pub struct Compilation {
    pub model: Result<Model, CompileError>,
    pub log: DiagnosticLog,
}

/// Why a chunk given at runtime cannot be used.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseChunkError {
    /// The text is not a pattern.
    #[error("cannot parse chunk: {0}")]
    Syntax(String),
    /// The pattern does not fit the chunks of the model.
    #[error("invalid chunk: {0}")]
    Invalid(String),
    /// The chunk is meant for a buffer the model doesn't have.
    #[error("buffer '{0}' not found in model")]
    UnknownBuffer(String),
}

/// Compile the source of a model.
pub fn generate_model(source: &str, options: &CompileOptions) -> Compilation {
    let mut log = DiagnosticLog::new();
    let model = compile(source, options, &mut log);
    Compilation { model, log }
}

/// Compile the model stored in the file at `path`.
pub fn generate_model_from_file<P: AsRef<Path>>(path: P, options: &CompileOptions) -> Compilation {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(source) => {
            info!("Compiling {}", path.display());
            generate_model(&source, options)
        }
        Err(err) => {
            let mut log = DiagnosticLog::new();
            log.error(None, format!("cannot read '{}': {}", path.display(), err));
            Compilation {
                model: Err(CompileError::Io(err)),
                log,
            }
        }
    }
}

fn compile(
    source: &str,
    options: &CompileOptions,
    log: &mut DiagnosticLog,
) -> Result<Model, CompileError> {
    let file = match parse_file(source) {
        Ok(file) => file,
        Err(err) => {
            if err.is_internal() {
                log.internal_error(err.location(), err.to_string());
            } else {
                log.error(err.location(), err.to_string());
            }
            return Err(CompileError::Parse);
        }
    };
    if options.debug {
        debug!("Syntax tree:\n{:#?}", file);
    }

    let model = ModelBuilder::new(log).build(&file);
    if log.has_error() {
        info!(
            "Model '{}' has {} error(s)",
            model.name(),
            log.error_count()
        );
        return Err(CompileError::Compile);
    }
    Ok(model)
}

/// Parse a chunk given at runtime (e.g. the initial content of the goal) against the chunks of
/// the model. Either bracket around the pattern can be omitted, an empty text means no chunk.
/// Internal chunks such as `_status` are rejected.
pub fn parse_chunk(model: &Model, text: &str) -> Result<Option<Pattern>, ParseChunkError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    let mut wrapped = String::with_capacity(text.len() + 2);
    if !text.starts_with('[') {
        wrapped.push('[');
    }
    wrapped.push_str(text);
    if !text.ends_with(']') {
        wrapped.push(']');
    }
    let pattern = parser::parse_pattern_input(&wrapped)
        .map_err(|err| ParseChunkError::Syntax(err.to_string()))?;

    let mut log = DiagnosticLog::new();
    match resolve_pattern(model, &mut log, &pattern) {
        Ok(pattern) if pattern.chunk.is_internal() => Err(ParseChunkError::Invalid(format!(
            "cannot use internal chunk '{}'",
            pattern.chunk.type_name
        ))),
        Ok(pattern) => Ok(Some(pattern)),
        Err(_) => Err(ParseChunkError::Invalid(
            log.first_entry()
                .map(|entry| entry.message().to_string())
                .unwrap_or_default(),
        )),
    }
}

/// Parse the initial content of some buffers, given as buffer name -> chunk text. The buffers
/// with an empty text are left out of the result.
pub fn parse_initial_buffers(
    model: &Model,
    buffers: &BTreeMap<String, String>,
) -> Result<BTreeMap<String, Pattern>, ParseChunkError> {
    let mut result = BTreeMap::new();
    for (buffer, text) in buffers {
        if model.lookup_buffer(buffer).is_none() {
            return Err(ParseChunkError::UnknownBuffer(buffer.clone()));
        }
        if let Some(pattern) = parse_chunk(model, text)? {
            result.insert(buffer.clone(), pattern);
        }
    }
    Ok(result)
}

/// The grammar of the amod files, in `pest` notation.
pub fn grammar() -> &'static str {
    GRAMMAR
}

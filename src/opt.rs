use std::path::PathBuf;

use clap::{Parser, ValueHint};

use amod_compiler::CompileOptions;

/// Compile amod models, reporting all their problems.
#[derive(Parser, Debug)]
#[clap(name = "amod", version)]
pub struct Opt {
    /// The amod files to compile
    #[clap(value_hint = ValueHint::FilePath, required_unless_present = "grammar")]
    pub files: Vec<PathBuf>,

    /// Emit the syntax tree of the files in the debug log (visible with -vv)
    #[clap(long)]
    pub debug: bool,

    /// Initial content of the goal buffer, checked against the compiled model
    ///
    /// The brackets can be omitted, e.g. `--goal "countFrom: 2 5"`.
    #[clap(long)]
    pub goal: Option<String>,

    /// Print the compiled models and their diagnostics as JSON
    #[clap(long)]
    pub json: bool,

    /// Print the grammar of the amod files
    #[clap(long)]
    pub grammar: bool,

    /// Do not use colors in the output
    #[clap(long = "no-colour", alias = "no-color")]
    pub no_colour: bool,

    #[clap(flatten, next_help_heading = Some("LOGGING"))]
    pub logger: LoggerOpt,
}

impl Opt {
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions { debug: self.debug }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct LoggerOpt {
    /// Verbose mode (-v, -vv, -vvv, etc.)
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl LoggerOpt {
    pub fn enable_log(&self) {
        if self.verbose > 0 {
            std::env::set_var("RUST_BACKTRACE", "1");
            match self.verbose {
                0 => unreachable!(),
                1 => std::env::set_var("RUST_LOG", "info"),
                2 => std::env::set_var("RUST_LOG", "debug"),
                _ => std::env::set_var("RUST_LOG", "trace"),
            }
        }

        env_logger::Builder::from_default_env()
            .format_timestamp_nanos()
            .init();
        better_panic::install();
    }
}

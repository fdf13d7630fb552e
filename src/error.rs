use std::fmt::Display;

use anyhow::Error;
use colored::Colorize;

/// Adds methods for failing without panic. Like `expect` but without panic.
pub trait NiceError<T> {
    /// Fail exiting with `1` if the value is an error, printing to stderr the message as well.
    /// Otherwise return the content.
    fn nice_expect<S: Display + Send + Sync + 'static>(self, mex: S) -> T;
}

fn print_error(error: Error) {
    debug!("{:?}", error);
    let mut fail: &dyn std::error::Error = error.as_ref();
    eprintln!("{}: {fail}", "Error".red().bold());
    while let Some(cause) = fail.source() {
        eprintln!("\nCaused by:\n    {cause}");
        fail = cause;
    }
}

impl<T> NiceError<T> for Result<T, Error> {
    fn nice_expect<S: Display + Send + Sync + 'static>(self, mex: S) -> T {
        match self {
            Ok(x) => x,
            Err(e) => {
                print_error(e.context(mex));
                std::process::exit(1);
            }
        }
    }
}

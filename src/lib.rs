//! # amod
//!
//! Command line front end of the amod compiler: it compiles the given model files, printing the
//! diagnostics of each one, and exits with an error if any of them is not valid.

#[macro_use]
extern crate log;

mod compile;
pub mod error;
pub mod opt;

pub use compile::*;
pub use opt::*;

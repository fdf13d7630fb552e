use clap::Parser;

use amod_rust::error::NiceError;
use amod_rust::{main_compile, Opt};

fn main() {
    let opt = Opt::parse();
    opt.logger.enable_log();

    main_compile(opt).nice_expect("Compilation failed")
}

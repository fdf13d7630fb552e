#![allow(dead_code)]

use std::path::{Path, PathBuf};

use amod_actr::Model;
use amod_compiler::{generate_model, Compilation, CompileOptions};

/// A model header declaring some chunks, to be completed with the other sections.
pub const HEADER: &str = "==model==
name: test
==config==
chunks {
    [goal: state]
    [count: current target]
    [fact: value]
}
";

pub fn data_file(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

pub fn compile(source: &str) -> Compilation {
    generate_model(source, &CompileOptions::default())
}

/// Compile the source with the default header prepended.
pub fn compile_with_header(rest: &str) -> Compilation {
    compile(&format!("{}{}", HEADER, rest))
}

/// Compile a source that must be valid, failing with all the diagnostics otherwise.
pub fn compile_ok(source: &str) -> Model {
    let compilation = compile(source);
    match compilation.model {
        Ok(model) => model,
        Err(err) => panic!(
            "{}\n{}",
            err,
            compilation.log.render("test.amod", source)
        ),
    }
}

pub fn errors(compilation: &Compilation) -> Vec<String> {
    compilation
        .log
        .errors()
        .map(|d| d.message().to_string())
        .collect()
}

pub fn warnings(compilation: &Compilation) -> Vec<String> {
    compilation
        .log
        .warnings()
        .map(|d| d.message().to_string())
        .collect()
}

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Error};
use colored::Colorize;
use serde_json::json;

use amod_actr::Model;
use amod_compiler::{generate_model, parse_initial_buffers, Compilation, CompileOptions};
use amod_diagnostics::DiagnosticLog;

use crate::Opt;

/// Entry point of the `amod` binary.
pub fn main_compile(opt: Opt) -> Result<(), Error> {
    if opt.no_colour {
        colored::control::set_override(false);
    }
    if opt.grammar {
        println!("{}", amod_compiler::grammar());
    }

    let options = opt.compile_options();
    let mut failed = 0;
    for path in &opt.files {
        if !compile_file(path, &opt, &options)? {
            failed += 1;
        }
    }
    if failed > 0 {
        bail!(
            "{} of {} model(s) failed to compile",
            failed,
            opt.files.len()
        );
    }
    Ok(())
}

/// Compile a single file, printing the outcome. Returns whether the model is valid.
fn compile_file(path: &Path, opt: &Opt, options: &CompileOptions) -> Result<bool, Error> {
    // The text is kept for rendering the diagnostics, so the file is not compiled by path.
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path.display().to_string();
    let Compilation { model, mut log } = generate_model(&source, options);

    let initial_buffers = match (&model, &opt.goal) {
        (Ok(model), Some(goal)) => initial_goal(model, goal, &mut log),
        _ => BTreeMap::new(),
    };
    let success = model.is_ok() && !log.has_error();

    if opt.json {
        let output = json!({
            "file": file_name,
            "model": model.as_ref().ok(),
            "initial_buffers": initial_buffers,
            "diagnostics": log.diagnostics(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialize the model")?
        );
        return Ok(success);
    }

    eprint!("{}", log.render(&file_name, &source));
    match &model {
        Ok(model) if success => println!(
            "{}: {} model '{}' ({} chunks, {} initializers, {} productions)",
            file_name.bold(),
            "compiled".green().bold(),
            model.name(),
            model.user_chunks().count(),
            model.initializers().len(),
            model.productions().len()
        ),
        _ => println!(
            "{}: {} ({} error(s))",
            file_name.bold(),
            "failed".red().bold(),
            log.error_count()
        ),
    }
    Ok(success)
}

/// Check the content given for the goal buffer, logging the problems.
fn initial_goal(
    model: &Model,
    goal: &str,
    log: &mut DiagnosticLog,
) -> BTreeMap<String, amod_actr::Pattern> {
    let buffers = BTreeMap::from([("goal".to_string(), goal.to_string())]);
    match parse_initial_buffers(model, &buffers) {
        Ok(parsed) => parsed,
        Err(err) => {
            log.error(None, format!("invalid initial goal: {}", err));
            BTreeMap::new()
        }
    }
}

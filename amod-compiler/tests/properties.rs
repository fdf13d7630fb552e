use std::collections::HashSet;

use amod_actr::{SlotValue, Statement, Value};
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

use utils::*;

mod utils;

#[test]
fn test_compilation_is_deterministic() {
    let source = std::fs::read_to_string(data_file("semantic.amod")).unwrap();
    let first = compile(&source);
    let second = compile(&source);
    assert_eq!(
        format!("{:?}", first.model.unwrap()),
        format!("{:?}", second.model.unwrap())
    );
    assert_eq!(first.log.diagnostics(), second.log.diagnostics());
}

#[test]
fn test_at_most_one_set_per_buffer() {
    for name in ["count.amod", "semantic.amod"] {
        let source = std::fs::read_to_string(data_file(name)).unwrap();
        let model = compile_ok(&source);
        for production in model.productions() {
            let mut buffers = HashSet::new();
            for set in production.statements.iter().filter_map(Statement::as_set) {
                assert!(
                    buffers.insert(set.buffer.clone()),
                    "buffer {} set twice in {}",
                    set.buffer,
                    production.name
                );
            }
        }
    }
}

#[test]
fn test_variables_are_bound() {
    for name in ["count.amod", "semantic.amod"] {
        let source = std::fs::read_to_string(data_file(name)).unwrap();
        let model = compile_ok(&source);
        for production in model.productions() {
            let mut vars = vec![];
            for m in &production.matches {
                vars.extend(m.pattern.vars().map(|(_, var)| var.name.clone()));
            }
            for statement in &production.statements {
                match statement {
                    Statement::Recall(recall) => {
                        vars.extend(recall.pattern.vars().map(|(_, var)| var.name.clone()))
                    }
                    Statement::Print(print) => {
                        vars.extend(print.values.iter().filter_map(Value::var_name).map(String::from))
                    }
                    Statement::Set(set) => vars.extend(
                        set.slots()
                            .iter()
                            .filter_map(|slot| slot.value.var_name())
                            .map(String::from),
                    ),
                    _ => {}
                }
            }
            for var in vars {
                assert!(
                    production.lookup_var(&var).is_some(),
                    "?{} is not bound in {}",
                    var,
                    production.name
                );
            }
        }
    }
}

#[test]
fn test_errors_are_accumulated() {
    let compilation = compile_with_header(
        "==init==
goal [nothing: 1]
fact [fact: 1]
==productions==
first {
    match { goal [goal: ?a] }
    do { print ?b }
}
second {
    match { goal [goal: ?a] }
    do { recall [fact: ?c] }
}
",
    );
    assert_that(&compilation.model).is_err();
    assert_eq!(
        errors(&compilation),
        vec![
            "could not find chunk named 'nothing'",
            "could not find module named 'fact'",
            "print statement variable '?b' not found in matches for production 'first'",
            "recall statement variable '?c' not found in matches for production 'second'",
        ]
    );
}

#[test]
fn test_single_use_variables_only_warn() {
    let compilation = compile_with_header(
        "==productions==
lonely {
    match { goal [count: ?c ?t] }
    do { print ?c }
}
",
    );
    assert_eq!(
        warnings(&compilation),
        vec!["variable '?t' is not used - should be simplified to '?' in production 'lonely'"]
    );
    let model = compilation.model.unwrap();
    let production = model.lookup_production("lonely").unwrap();
    let slot = &production.matches[0].pattern.slots[1];
    assert!(matches!(&slot.value, SlotValue::Var(var) if var.name == "t"));
}

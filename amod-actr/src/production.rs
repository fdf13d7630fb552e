use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::pattern::{Constraint, Pattern, SlotValue};
use crate::statement::{SetStatement, Statement};

/// A condition of a production: the content of a buffer (or the state of the memory) must match
/// the pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// The buffer the pattern is matched against.
    pub buffer: String,
    /// The name of the memory module, if the match targets the memory or its buffer.
    pub memory: Option<String>,
    pub pattern: Pattern,
}

/// Where a variable of a production is bound: the first slot, in match order, it appears in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarIndex {
    pub buffer: String,
    pub slot_name: String,
    /// Index of the match inside [`Production::matches`].
    pub match_index: usize,
    /// Index of the slot inside the pattern of the match.
    pub slot_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Production {
    pub name: String,
    pub description: Option<String>,
    pub matches: Vec<Match>,
    pub var_index_map: BTreeMap<String, VarIndex>,
    pub statements: Vec<Statement>,
    /// The line of the amod source where the production is declared.
    pub line: usize,
}

impl Production {
    pub fn new<S: Into<String>>(name: S, description: Option<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            description,
            matches: vec![],
            var_index_map: BTreeMap::new(),
            statements: vec![],
            line,
        }
    }

    /// Append a match and return its index.
    pub fn add_match(&mut self, m: Match) -> usize {
        self.matches.push(m);
        self.matches.len() - 1
    }

    /// Bind the variables of the match at `match_index` that are not bound yet. Returns the names
    /// of the newly bound variables.
    pub fn bind_match_vars(&mut self, match_index: usize) -> Vec<String> {
        let mut bound = vec![];
        let Some(m) = self.matches.get(match_index) else {
            return bound;
        };
        for (slot_index, var) in m.pattern.vars() {
            if self.var_index_map.contains_key(&var.name) {
                continue;
            }
            let slot_name = m
                .pattern
                .chunk
                .slot_name(slot_index)
                .unwrap_or_default()
                .to_string();
            self.var_index_map.insert(
                var.name.clone(),
                VarIndex {
                    buffer: m.buffer.clone(),
                    slot_name,
                    match_index,
                    slot_index,
                },
            );
            bound.push(var.name.clone());
        }
        bound
    }

    pub fn lookup_var(&self, name: &str) -> Option<&VarIndex> {
        self.var_index_map.get(name)
    }

    /// Attach the constraint to the variable it refers to. Returns `false` if the variable is not
    /// bound by any match.
    pub fn add_constraint(&mut self, constraint: Constraint) -> bool {
        let Some(index) = self.var_index_map.get(&constraint.lhs) else {
            return false;
        };
        let slot = self
            .matches
            .get_mut(index.match_index)
            .and_then(|m| m.pattern.slots.get_mut(index.slot_index));
        match slot {
            Some(slot) => match &mut slot.value {
                SlotValue::Var(var) => {
                    var.constraints.push(constraint);
                    true
                }
                _ => false,
            },
            None => false,
        }
    }

    /// The first match against the given buffer.
    pub fn lookup_match_by_buffer(&self, buffer: &str) -> Option<&Match> {
        self.matches.iter().find(|m| m.buffer == buffer)
    }

    pub fn lookup_set_statement(&self, buffer: &str) -> Option<&SetStatement> {
        self.statements
            .iter()
            .filter_map(Statement::as_set)
            .find(|set| set.buffer == buffer)
    }

    pub fn lookup_set_statement_mut(&mut self, buffer: &str) -> Option<&mut SetStatement> {
        self.statements
            .iter_mut()
            .filter_map(Statement::as_set_mut)
            .find(|set| set.buffer == buffer)
    }

    pub fn add_statement(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    pub fn has_print_statement(&self) -> bool {
        self.statements
            .iter()
            .any(|s| matches!(s, Statement::Print(_)))
    }

    pub fn has_recall_statement(&self) -> bool {
        self.statements
            .iter()
            .any(|s| matches!(s, Statement::Recall(_)))
    }
}

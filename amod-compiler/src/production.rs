//! Compilation of the productions.
//!
//! A production goes through a fixed sequence of stages, see [`ProductionState`]. The first two
//! stages stop at their first failure since the later ones depend on them; the statements and
//! the usage of the variables are always all checked, so that every problem is reported.

use std::collections::{HashMap, HashSet};

use amod_actr::{
    ClearStatement, Comparison, Constraint, Match, Model, Module, PrintStatement, Production,
    RecallStatement, SetSlot, SetStatement, SetTarget, Statement, BUFFER_STATUSES,
    MEMORY_STATUSES, STATUS_CHUNK_NAME,
};
use amod_diagnostics::{DiagnosticLog, Location};

use crate::cst;
use crate::resolve::{resolve_pattern, resolve_slot, resolve_value, Logged};

/// The stages of the compilation of a production, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum ProductionState {
    /// Nothing has been checked yet.
    Unvalidated,
    /// Every match refers to an existing buffer or memory, with a sensible pattern.
    MatchesValidated,
    /// The patterns are resolved and their variables bound.
    PatternsBound,
    StatementsCompiled,
    /// Every variable is bound, the ones used only once have been reported.
    UsageChecked,
}

/// Compiles a single production of the source against a model.
pub(crate) struct ProductionCompiler<'a> {
    model: &'a Model,
    log: &'a mut DiagnosticLog,
    source: &'a cst::Production,
    production: Production,
    state: ProductionState,
    /// The variables already reported as unbound.
    reported: HashSet<String>,
}

impl<'a> ProductionCompiler<'a> {
    pub fn new(model: &'a Model, log: &'a mut DiagnosticLog, source: &'a cst::Production) -> Self {
        Self {
            model,
            log,
            source,
            production: Production::new(
                source.name.as_str(),
                source.description.clone(),
                source.location.line,
            ),
            state: ProductionState::Unvalidated,
            reported: HashSet::new(),
        }
    }

    /// Compile the production. `None` is returned if any error has been logged while compiling
    /// it.
    pub fn compile(mut self) -> Option<Production> {
        let errors = self.log.error_count();
        if !self.validate_matches() {
            return self.exclude();
        }
        self.advance(ProductionState::MatchesValidated);
        if !self.bind_patterns() {
            return self.exclude();
        }
        self.advance(ProductionState::PatternsBound);
        let compiled = self.compile_statements();
        if compiled {
            self.advance(ProductionState::StatementsCompiled);
        }
        if self.check_variable_usage() && compiled {
            self.advance(ProductionState::UsageChecked);
        }
        if self.state != ProductionState::UsageChecked || self.log.error_count() > errors {
            return self.exclude();
        }
        Some(self.production)
    }

    fn name(&self) -> &'a str {
        self.source.name.as_str()
    }

    fn advance(&mut self, next: ProductionState) {
        debug_assert!(next > self.state);
        trace!(
            "Production '{}': {:?} -> {:?}",
            self.name(),
            self.state,
            next
        );
        self.state = next;
    }

    fn exclude(self) -> Option<Production> {
        debug!(
            "Production '{}' excluded from the model at {:?}",
            self.name(),
            self.state
        );
        None
    }

    fn error(&mut self, location: Location, message: String) -> Logged {
        self.log.error(Some(location), message);
        Logged
    }

    fn validate_matches(&mut self) -> bool {
        let source = self.source;
        let mut valid = true;
        for item in &source.matches {
            valid &= self.validate_match(item).is_ok();
        }
        valid
    }

    fn validate_match(&mut self, item: &cst::MatchItem) -> Result<(), Logged> {
        let name = self.name();
        let target = item.name.as_str();
        let is_memory = self.model.lookup_memory(target).is_some();
        if !is_memory && self.model.lookup_buffer(target).is_none() {
            return Err(self.error(
                item.name.location,
                format!(
                    "buffer or memory '{}' not found in production '{}'",
                    target, name
                ),
            ));
        }
        let Some(pattern) = &item.pattern else {
            return Err(self.error(
                item.location,
                format!("invalid pattern for '{}' in production '{}'", target, name),
            ));
        };
        if pattern.chunk_name.as_str() == STATUS_CHUNK_NAME {
            self.validate_status(target, is_memory, pattern)?;
        }
        Ok(())
    }

    /// A `_status` pattern has a single slot with one of the states of the target.
    fn validate_status(
        &mut self,
        target: &str,
        is_memory: bool,
        pattern: &cst::Pattern,
    ) -> Result<(), Logged> {
        let name = self.name();
        let (statuses, expected) = if is_memory {
            (MEMORY_STATUSES, "'busy', 'free', or 'error'")
        } else {
            (BUFFER_STATUSES, "'full' or 'empty'")
        };
        let items = pattern.slots.items();
        let [item] = items.as_slice() else {
            return Err(self.error(
                pattern.location,
                format!(
                    "_status should only have one slot for '{}' in production '{}' (should be {})",
                    target, name, expected
                ),
            ));
        };
        let status = resolve_slot(item);
        if !status.id().is_some_and(|id| statuses.contains(&id)) {
            return Err(self.error(
                item.location,
                format!(
                    "invalid _status '{}' for '{}' in production '{}' (should be {})",
                    status, target, name, expected
                ),
            ));
        }
        Ok(())
    }

    /// The buffer a match refers to, and the memory if it queries one.
    fn match_target(&self, name: &str) -> (String, Option<String>) {
        match self.model.lookup_memory(name) {
            Some(memory) => (
                memory.only_buffer().unwrap_or(name).to_string(),
                Some(memory.module_name().to_string()),
            ),
            None => (name.to_string(), None),
        }
    }

    fn bind_patterns(&mut self) -> bool {
        let source = self.source;
        let mut bound = true;
        for item in &source.matches {
            let Some(pattern) = &item.pattern else {
                continue;
            };
            let Ok(pattern) = resolve_pattern(self.model, self.log, pattern) else {
                bound = false;
                continue;
            };
            let (buffer, memory) = self.match_target(item.name.as_str());
            let index = self.production.add_match(Match {
                buffer,
                memory,
                pattern,
            });
            let vars = self.production.bind_match_vars(index);
            trace!(
                "Production '{}': match #{} binds {:?}",
                self.name(),
                index,
                vars
            );
        }
        if !bound {
            return false;
        }

        // the guards can refer to variables bound by any match of the production
        for item in &source.matches {
            for comparison in &item.when {
                let constraint = Constraint {
                    lhs: comparison.var.name.clone(),
                    comparison: match comparison.op {
                        cst::ComparisonOp::Equal => Comparison::Equal,
                        cst::ComparisonOp::NotEqual => Comparison::NotEqual,
                    },
                    rhs: resolve_value(&comparison.rhs),
                };
                // unbound variables are reported by the usage check
                self.production.add_constraint(constraint);
            }
        }
        true
    }

    fn compile_statements(&mut self) -> bool {
        let source = self.source;
        let mut compiled = true;
        for statement in &source.statements {
            let result = match statement {
                cst::Statement::Set(set) => self.compile_set(set),
                cst::Statement::Recall(recall) => self.compile_recall(recall),
                cst::Statement::Clear(clear) => self.compile_clear(clear),
                cst::Statement::Print(print) => self.compile_print(print),
                cst::Statement::Stop(_) => {
                    self.production.add_statement(Statement::Stop);
                    Ok(())
                }
            };
            compiled &= result.is_ok();
        }
        compiled
    }

    fn compile_set(&mut self, set: &cst::SetStatement) -> Result<(), Logged> {
        let name = self.name();
        let buffer = set.buffer.as_str();
        if self.model.lookup_buffer(buffer).is_none() {
            return Err(self.error(
                set.buffer.location,
                format!("buffer '{}' not found in production '{}'", buffer, name),
            ));
        }
        match (&set.slot, &set.value) {
            (Some(slot), cst::SetValue::Pattern(pattern)) => Err(self.error(
                pattern.location,
                format!(
                    "cannot set a slot ('{}') to a pattern in match buffer '{}' in production '{}'",
                    slot.as_str(),
                    buffer,
                    name
                ),
            )),
            (Some(slot), cst::SetValue::Arg(arg)) => self.compile_set_slot(&set.buffer, slot, arg),
            (None, cst::SetValue::Arg(arg)) => Err(self.error(
                arg.location,
                format!(
                    "buffer '{}' must be set to a pattern in production '{}'",
                    buffer, name
                ),
            )),
            (None, cst::SetValue::Pattern(pattern)) => {
                self.compile_set_pattern(&set.buffer, pattern)
            }
        }
    }

    /// `set buffer.slot to value`: the slots set on the same buffer are merged in a single
    /// statement.
    fn compile_set_slot(
        &mut self,
        buffer: &cst::Ident,
        slot: &cst::Ident,
        arg: &cst::Arg,
    ) -> Result<(), Logged> {
        let name = self.name();
        let Some(matched) = self.production.lookup_match_by_buffer(buffer.as_str()) else {
            return Err(self.error(
                buffer.location,
                format!(
                    "match buffer '{}' not found in production '{}'",
                    buffer.as_str(),
                    name
                ),
            ));
        };
        let chunk = matched.pattern.chunk.clone();
        if chunk.is_internal() {
            return Err(self.error(
                slot.location,
                format!(
                    "cannot set a slot of '{}' in match buffer '{}' in production '{}'",
                    chunk.type_name,
                    buffer.as_str(),
                    name
                ),
            ));
        }
        let Some(slot_index) = chunk.slot_index(slot.as_str()) else {
            return Err(self.error(
                slot.location,
                format!(
                    "slot '{}' does not exist in chunk '{}' for match buffer '{}' in production '{}'",
                    slot.as_str(),
                    chunk.type_name,
                    buffer.as_str(),
                    name
                ),
            ));
        };
        let value = resolve_value(arg);
        if let Some(var) = value.var_name() {
            self.check_bound(var, arg.location, "set statement")?;
        }

        if let Some(existing) = self.production.lookup_set_statement(buffer.as_str()) {
            let conflict = match &existing.target {
                SetTarget::Pattern(_) => Some(format!(
                    "buffer '{}' is already set to a pattern in production '{}'",
                    buffer.as_str(),
                    name
                )),
                SetTarget::Slots { slots, .. } if slots.iter().any(|s| s.name == slot.name) => {
                    Some(format!(
                        "slot '{}' of buffer '{}' is set more than once in production '{}'",
                        slot.as_str(),
                        buffer.as_str(),
                        name
                    ))
                }
                SetTarget::Slots { .. } => None,
            };
            if let Some(message) = conflict {
                return Err(self.error(slot.location, message));
            }
        }

        let set_slot = SetSlot {
            name: slot.name.clone(),
            slot_index,
            value,
        };
        if let Some(SetStatement {
            target: SetTarget::Slots { slots, .. },
            ..
        }) = self.production.lookup_set_statement_mut(buffer.as_str())
        {
            slots.push(set_slot);
            return Ok(());
        }
        self.production.add_statement(Statement::Set(SetStatement {
            buffer: buffer.name.clone(),
            target: SetTarget::Slots {
                chunk,
                slots: vec![set_slot],
            },
        }));
        Ok(())
    }

    /// `set buffer to [pattern]`: replaces the whole content of the buffer, so it cannot be mixed
    /// with other assignments of the same buffer.
    fn compile_set_pattern(
        &mut self,
        buffer: &cst::Ident,
        pattern: &cst::Pattern,
    ) -> Result<(), Logged> {
        let name = self.name();
        if let Some(existing) = self.production.lookup_set_statement(buffer.as_str()) {
            let message = match existing.target {
                SetTarget::Pattern(_) => format!(
                    "buffer '{}' is set to a pattern more than once in production '{}'",
                    buffer.as_str(),
                    name
                ),
                SetTarget::Slots { .. } => format!(
                    "buffer '{}' cannot be set to a pattern after setting its slots in production '{}'",
                    buffer.as_str(),
                    name
                ),
            };
            return Err(self.error(pattern.location, message));
        }
        self.check_pattern_vars(pattern, "set statement")?;
        let pattern = resolve_pattern(self.model, self.log, pattern)?;
        self.production.add_statement(Statement::Set(SetStatement {
            buffer: buffer.name.clone(),
            target: SetTarget::Pattern(pattern),
        }));
        Ok(())
    }

    fn compile_recall(&mut self, recall: &cst::RecallStatement) -> Result<(), Logged> {
        if self.production.has_recall_statement() {
            let name = self.name();
            return Err(self.error(
                recall.location,
                format!(
                    "only one recall statement per production is allowed in production '{}'",
                    name
                ),
            ));
        }
        self.check_pattern_vars(&recall.pattern, "recall statement")?;
        let pattern = resolve_pattern(self.model, self.log, &recall.pattern)?;
        self.production
            .add_statement(Statement::Recall(RecallStatement {
                memory_name: self.model.memory().module_name().to_string(),
                pattern,
            }));
        Ok(())
    }

    fn compile_clear(&mut self, clear: &cst::ClearStatement) -> Result<(), Logged> {
        let name = self.name();
        let mut result = Ok(());
        for buffer in &clear.buffers {
            if self.model.lookup_buffer(buffer.as_str()).is_none() {
                result = Err(self.error(
                    buffer.location,
                    format!(
                        "buffer '{}' not found in production '{}'",
                        buffer.as_str(),
                        name
                    ),
                ));
            }
        }
        result?;
        self.production.add_statement(Statement::Clear(ClearStatement {
            buffer_names: clear.buffers.iter().map(|b| b.name.clone()).collect(),
        }));
        Ok(())
    }

    fn compile_print(&mut self, print: &cst::PrintStatement) -> Result<(), Logged> {
        let mut result = Ok(());
        for arg in &print.args {
            if let cst::ArgValue::Var(var) = &arg.value {
                if let Err(logged) = self.check_bound(var, arg.location, "print statement") {
                    result = Err(logged);
                }
            }
        }
        result?;
        self.production.add_statement(Statement::Print(PrintStatement {
            values: print.args.iter().map(resolve_value).collect(),
        }));
        Ok(())
    }

    /// Make sure all the variables of the pattern are bound by the matches.
    fn check_pattern_vars(&mut self, pattern: &cst::Pattern, context: &str) -> Result<(), Logged> {
        let mut result = Ok(());
        for item in pattern.slots.items() {
            if let cst::SlotValue::Var(var) = &item.value {
                if let Err(logged) = self.check_bound(var, item.location, context) {
                    result = Err(logged);
                }
            }
        }
        result
    }

    /// Make sure the variable is bound by a match. Every unbound variable is reported once.
    fn check_bound(&mut self, var: &str, location: Location, context: &str) -> Result<(), Logged> {
        if self.production.lookup_var(var).is_some() {
            return Ok(());
        }
        if !self.reported.insert(var.to_string()) {
            return Err(Logged);
        }
        let name = self.name();
        Err(self.error(
            location,
            format!(
                "{} variable '?{}' not found in matches for production '{}'",
                context, var, name
            ),
        ))
    }

    /// Report the unbound variables of the guards, and warn about the variables used only once:
    /// they can be replaced by a wildcard. Returns `false` if an error has been logged.
    fn check_variable_usage(&mut self) -> bool {
        let source = self.source;
        let mut valid = true;
        for item in &source.matches {
            for comparison in &item.when {
                valid &= self
                    .check_bound(&comparison.var.name, comparison.var.location, "when clause")
                    .is_ok();
                if let cst::ArgValue::Var(var) = &comparison.rhs.value {
                    valid &= self
                        .check_bound(var, comparison.rhs.location, "when clause")
                        .is_ok();
                }
            }
        }

        let name = self.name();
        let occurrences = var_occurrences(source);
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for (var, _) in &occurrences {
            *counts.entry(*var).or_default() += 1;
        }
        for &(var, location) in &occurrences {
            if counts[var] == 1 && self.production.lookup_var(var).is_some() {
                self.log.warning(
                    Some(location),
                    format!(
                        "variable '?{}' is not used - should be simplified to '?' in production '{}'",
                        var, name
                    ),
                );
            }
        }
        valid
    }
}

/// Every use of a variable in the production, in source order.
fn var_occurrences(production: &cst::Production) -> Vec<(&str, Location)> {
    fn pattern_vars<'p>(pattern: &'p cst::Pattern, result: &mut Vec<(&'p str, Location)>) {
        for item in pattern.slots.items() {
            if let cst::SlotValue::Var(var) = &item.value {
                result.push((var.as_str(), item.location));
            }
        }
    }
    fn arg_var<'p>(arg: &'p cst::Arg, result: &mut Vec<(&'p str, Location)>) {
        if let cst::ArgValue::Var(var) = &arg.value {
            result.push((var.as_str(), arg.location));
        }
    }

    let mut result = vec![];
    for item in &production.matches {
        if let Some(pattern) = &item.pattern {
            pattern_vars(pattern, &mut result);
        }
        for comparison in &item.when {
            result.push((comparison.var.as_str(), comparison.var.location));
            arg_var(&comparison.rhs, &mut result);
        }
    }
    for statement in &production.statements {
        match statement {
            cst::Statement::Set(set) => match &set.value {
                cst::SetValue::Pattern(pattern) => pattern_vars(pattern, &mut result),
                cst::SetValue::Arg(arg) => arg_var(arg, &mut result),
            },
            cst::Statement::Recall(recall) => pattern_vars(&recall.pattern, &mut result),
            cst::Statement::Print(print) => {
                print.args.iter().for_each(|arg| arg_var(arg, &mut result))
            }
            cst::Statement::Clear(_) | cst::Statement::Stop(_) => {}
        }
    }
    result
}

//! Resolution of the patterns of the source against the declared chunks.

use amod_actr::{Model, Pattern, PatternSlot, PatternVar, SlotValue, Value};
use amod_diagnostics::DiagnosticLog;

use crate::cst;

/// A failure whose diagnostics are already in the log: the caller only has to skip the
/// declaration it was processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Logged;

/// Resolve a pattern of the source into a [`Pattern`] with one slot per slot of its chunk.
///
/// Positional patterns must have exactly as many items as the chunk has slots. Named patterns
/// can only use the slots of the chunk, each at most once; the slots they don't mention are
/// wildcards.
pub(crate) fn resolve_pattern(
    model: &Model,
    log: &mut DiagnosticLog,
    pattern: &cst::Pattern,
) -> Result<Pattern, Logged> {
    let chunk_name = &pattern.chunk_name;
    let Some(chunk) = model.lookup_chunk(chunk_name.as_str()) else {
        log.error(
            Some(chunk_name.location),
            format!("could not find chunk named '{}'", chunk_name.as_str()),
        );
        return Err(Logged);
    };

    let mut resolved = Pattern::new(chunk.clone());
    match &pattern.slots {
        cst::PatternSlots::Positional(items) => {
            if items.len() != chunk.num_slots() {
                log.error(
                    Some(pattern.location),
                    format!(
                        "invalid chunk - '{}' expects {} slot{} but {} {} given",
                        chunk.type_name,
                        chunk.num_slots(),
                        if chunk.num_slots() == 1 { "" } else { "s" },
                        items.len(),
                        if items.len() == 1 { "was" } else { "were" },
                    ),
                );
                return Err(Logged);
            }
            for item in items {
                resolved.add_slot(resolve_slot(item));
            }
        }
        cst::PatternSlots::Named(slots) => {
            let mut assigned: Vec<Option<PatternSlot>> = vec![None; chunk.num_slots()];
            let mut failed = false;
            for slot in slots {
                let Some(index) = chunk.slot_index(slot.name.as_str()) else {
                    log.error(
                        Some(slot.name.location),
                        format!(
                            "slot '{}' does not exist in chunk '{}'",
                            slot.name.as_str(),
                            chunk.type_name
                        ),
                    );
                    failed = true;
                    continue;
                };
                if assigned[index].is_some() {
                    log.error(
                        Some(slot.name.location),
                        format!(
                            "slot '{}' is used more than once in pattern of chunk '{}'",
                            slot.name.as_str(),
                            chunk.type_name
                        ),
                    );
                    failed = true;
                    continue;
                }
                assigned[index] = Some(resolve_slot(&slot.item));
            }
            if failed {
                return Err(Logged);
            }
            for slot in assigned {
                resolved.add_slot(slot.unwrap_or_else(PatternSlot::wildcard));
            }
        }
    }
    Ok(resolved)
}

/// Translate a slot item of the source into a [`PatternSlot`].
pub(crate) fn resolve_slot(item: &cst::SlotItem) -> PatternSlot {
    let value = match &item.value {
        cst::SlotValue::Wildcard => SlotValue::Wildcard,
        cst::SlotValue::Nil => SlotValue::Nil,
        cst::SlotValue::Id(id) => SlotValue::Id(id.clone()),
        cst::SlotValue::Str(s) => SlotValue::Str(s.clone()),
        cst::SlotValue::Number(n) => SlotValue::Number(n.clone()),
        cst::SlotValue::Var(name) => SlotValue::Var(PatternVar::new(name.as_str())),
    };
    PatternSlot {
        negated: item.negated,
        value,
    }
}

/// Translate an argument of the source into a [`Value`].
pub(crate) fn resolve_value(arg: &cst::Arg) -> Value {
    match &arg.value {
        cst::ArgValue::Nil => Value::Nil,
        cst::ArgValue::Var(name) => Value::Var(name.clone()),
        cst::ArgValue::Id(id) => Value::Id(id.clone()),
        cst::ArgValue::Str(s) => Value::Str(s.clone()),
        cst::ArgValue::Number(n) => Value::Number(n.clone()),
    }
}

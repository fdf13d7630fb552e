use serde::{Deserialize, Serialize};

use crate::chunk::Chunk;
use crate::pattern::{Pattern, Value};

/// An action of the `do` block of a production.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Statement {
    Set(SetStatement),
    Recall(RecallStatement),
    Clear(ClearStatement),
    Print(PrintStatement),
    Stop,
}

impl Statement {
    pub fn as_set(&self) -> Option<&SetStatement> {
        match self {
            Statement::Set(set) => Some(set),
            _ => None,
        }
    }

    pub fn as_set_mut(&mut self) -> Option<&mut SetStatement> {
        match self {
            Statement::Set(set) => Some(set),
            _ => None,
        }
    }
}

/// Modification of the content of a buffer. All the `set` lines of a production targeting the
/// same buffer are merged into a single [`SetStatement`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetStatement {
    pub buffer: String,
    pub target: SetTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetTarget {
    /// Assign some slots of the chunk currently in the buffer, in source order.
    Slots { chunk: Chunk, slots: Vec<SetSlot> },
    /// Replace the content of the buffer.
    Pattern(Pattern),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetSlot {
    pub name: String,
    pub slot_index: usize,
    pub value: Value,
}

impl SetStatement {
    /// The slot assignments, empty when the whole buffer is replaced.
    pub fn slots(&self) -> &[SetSlot] {
        match &self.target {
            SetTarget::Slots { slots, .. } => slots,
            SetTarget::Pattern(_) => &[],
        }
    }

    pub fn pattern(&self) -> Option<&Pattern> {
        match &self.target {
            SetTarget::Pattern(pattern) => Some(pattern),
            SetTarget::Slots { .. } => None,
        }
    }
}

/// A request to the declarative memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecallStatement {
    pub memory_name: String,
    pub pattern: Pattern,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearStatement {
    pub buffer_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintStatement {
    pub values: Vec<Value>,
}

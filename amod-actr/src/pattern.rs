use std::fmt::{Display, Formatter};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::chunk::Chunk;

/// A literal or a variable used as an argument: the value of a slot assignment, the right hand
/// side of a constraint or an argument of `print`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    Nil,
    /// A variable, stored without the leading `?`.
    Var(String),
    Id(String),
    Str(String),
    /// A numeric literal, kept as written in the source.
    Number(String),
}

impl Value {
    pub fn var_name(&self) -> Option<&str> {
        match self {
            Value::Var(name) => Some(name),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Var(name) => write!(f, "?{}", name),
            Value::Id(id) => f.write_str(id),
            Value::Str(s) => write!(f, "'{}'", s),
            Value::Number(n) => f.write_str(n),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparison {
    Equal,
    NotEqual,
}

impl Display for Comparison {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Comparison::Equal => f.write_str("=="),
            Comparison::NotEqual => f.write_str("!="),
        }
    }
}

/// A guard on a variable, from the `when` clause of a match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Constraint {
    pub lhs: String,
    pub comparison: Comparison,
    pub rhs: Value,
}

impl Display for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "?{} {} {}", self.lhs, self.comparison, self.rhs)
    }
}

/// A variable in a pattern, with the constraints attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatternVar {
    pub name: String,
    pub constraints: Vec<Constraint>,
}

impl PatternVar {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            constraints: vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotValue {
    /// `?`, matches anything.
    Wildcard,
    Nil,
    Id(String),
    Str(String),
    Number(String),
    Var(PatternVar),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatternSlot {
    pub negated: bool,
    pub value: SlotValue,
}

impl PatternSlot {
    pub fn new(value: SlotValue) -> Self {
        Self {
            negated: false,
            value,
        }
    }

    pub fn wildcard() -> Self {
        Self::new(SlotValue::Wildcard)
    }

    pub fn var(&self) -> Option<&PatternVar> {
        match &self.value {
            SlotValue::Var(var) => Some(var),
            _ => None,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match &self.value {
            SlotValue::Id(id) => Some(id),
            _ => None,
        }
    }
}

impl Display for PatternSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.negated {
            f.write_str("!")?;
        }
        match &self.value {
            SlotValue::Wildcard => f.write_str("?"),
            SlotValue::Nil => f.write_str("nil"),
            SlotValue::Id(id) => f.write_str(id),
            SlotValue::Str(s) => write!(f, "'{}'", s),
            SlotValue::Number(n) => f.write_str(n),
            SlotValue::Var(var) => write!(f, "?{}", var.name),
        }
    }
}

/// A chunk reference together with one [`PatternSlot`] per slot of the chunk, in the order the
/// chunk declares them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pattern {
    pub chunk: Chunk,
    pub slots: Vec<PatternSlot>,
}

impl Pattern {
    pub fn new(chunk: Chunk) -> Self {
        Self {
            chunk,
            slots: vec![],
        }
    }

    pub fn add_slot(&mut self, slot: PatternSlot) {
        self.slots.push(slot);
    }

    /// The variables of this pattern, with the index of the slot they are in.
    pub fn vars(&self) -> impl Iterator<Item = (usize, &PatternVar)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.var().map(|var| (index, var)))
    }

    /// The identifier literals of this pattern.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().filter_map(PatternSlot::id)
    }

    /// The slot with the given name, if the chunk declares it.
    pub fn slot_named(&self, name: &str) -> Option<&PatternSlot> {
        self.chunk
            .slot_index(name)
            .and_then(|index| self.slots.get(index))
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}: {}]",
            self.chunk.type_name,
            self.slots.iter().map(|s| s.to_string()).join(" ")
        )
    }
}

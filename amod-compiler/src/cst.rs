//! Concrete syntax tree of an amod file.
//!
//! Every node keeps the [`Location`] of the source it was parsed from, so that the later stages
//! can point their diagnostics at the offending text. Nodes spanning more than one line have a
//! zero-width location at their start.

use amod_diagnostics::Location;

/// An identifier with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub location: Location,
}

impl Ident {
    pub fn as_str(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AmodFile {
    pub model: ModelSection,
    pub config: Option<ConfigSection>,
    pub init: Option<InitSection>,
    pub productions: Option<ProductionSection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSection {
    pub name: Ident,
    pub description: Option<String>,
    pub authors: Vec<String>,
    pub examples: Vec<Pattern>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigSection {
    /// The fields of the `gactar` block.
    pub gactar: Vec<Field>,
    pub modules: Vec<ModuleConfig>,
    pub chunks: Vec<ChunkDecl>,
}

/// A module block of the `modules` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleConfig {
    pub name: Ident,
    pub fields: Vec<Field>,
    pub location: Location,
}

/// A chunk type declaration: `[name: slot1 slot2 ...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkDecl {
    pub name: Ident,
    pub slots: Vec<Ident>,
    pub location: Location,
}

/// A configuration field: `key: value` or `key { ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: Ident,
    pub value: FieldValue,
    pub value_location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Id(String),
    Str(String),
    Number(String),
    Fields(Vec<Field>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct InitSection {
    pub initializers: Vec<Initialization>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Initialization {
    Module(ModuleInitializer),
    Similar(Vec<SimilarityDecl>),
}

/// The initial content of a module: `module [...]` or `module { ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleInitializer {
    pub module: Ident,
    pub entries: Vec<InitEntry>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InitEntry {
    /// A pattern for the only buffer of the module.
    Pattern(NamedPattern),
    /// Some patterns for a specific buffer of the module: `buffer { ... }`.
    Buffer {
        buffer: Ident,
        patterns: Vec<NamedPattern>,
    },
}

/// A pattern optionally preceded by the name of the chunk instance it declares.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedPattern {
    pub name: Option<Ident>,
    pub pattern: Pattern,
    pub location: Location,
}

/// `( chunk_one chunk_two value )` in a `similar` block.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityDecl {
    pub chunk_one: Ident,
    pub chunk_two: Ident,
    pub value: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductionSection {
    pub productions: Vec<Production>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Production {
    pub name: Ident,
    pub description: Option<String>,
    pub matches: Vec<MatchItem>,
    pub statements: Vec<Statement>,
    pub location: Location,
}

/// An item of the `match` block: a buffer (or memory) with its pattern and guards.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchItem {
    pub name: Ident,
    pub pattern: Option<Pattern>,
    pub when: Vec<Comparison>,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Equal,
    NotEqual,
}

/// A guard of a `when` clause: `?var == arg` or `?var != arg`.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// The variable, without the leading `?`.
    pub var: Ident,
    pub op: ComparisonOp,
    pub rhs: Arg,
}

/// A literal or a variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    pub value: ArgValue,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Nil,
    Var(String),
    Id(String),
    Str(String),
    Number(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub chunk_name: Ident,
    pub slots: PatternSlots,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PatternSlots {
    /// `[chunk: a b c]`, one item per slot of the chunk.
    Positional(Vec<SlotItem>),
    /// `[chunk slot: a other: b]`, the missing slots are wildcards.
    Named(Vec<NamedSlot>),
}

impl PatternSlots {
    /// The slot items, in source order.
    pub fn items(&self) -> Vec<&SlotItem> {
        match self {
            PatternSlots::Positional(items) => items.iter().collect(),
            PatternSlots::Named(slots) => slots.iter().map(|s| &s.item).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PatternSlots::Positional(items) => items.len(),
            PatternSlots::Named(slots) => slots.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedSlot {
    pub name: Ident,
    pub item: SlotItem,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotItem {
    pub negated: bool,
    pub value: SlotValue,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotValue {
    Wildcard,
    Nil,
    Id(String),
    Str(String),
    Number(String),
    /// A variable, without the leading `?`.
    Var(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Set(SetStatement),
    Recall(RecallStatement),
    Clear(ClearStatement),
    Print(PrintStatement),
    Stop(Location),
}

impl Statement {
    pub fn location(&self) -> Location {
        match self {
            Statement::Set(s) => s.location,
            Statement::Recall(s) => s.location,
            Statement::Clear(s) => s.location,
            Statement::Print(s) => s.location,
            Statement::Stop(location) => *location,
        }
    }
}

/// `set buffer.slot to value` or `set buffer to [pattern]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SetStatement {
    pub buffer: Ident,
    pub slot: Option<Ident>,
    pub value: SetValue,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SetValue {
    Pattern(Pattern),
    Arg(Arg),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecallStatement {
    pub pattern: Pattern,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClearStatement {
    pub buffers: Vec<Ident>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrintStatement {
    pub args: Vec<Arg>,
    pub location: Location,
}

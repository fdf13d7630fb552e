//! Intermediate representation of a cognitive model compiled from amod source.
//!
//! The [`Model`] produced by the compiler is fully cross-referenced: every [`Pattern`] carries
//! the [`Chunk`] it refers to, every variable of a [`Production`] is bound to the buffer slot it
//! comes from, and all the `set` lines targeting the same buffer are merged into a single
//! [`Statement::Set`]. Once built, the model is consumed read-only by the renderers of the
//! various frameworks.

mod buffer;
mod chunk;
mod model;
pub mod modules;
mod params;
mod pattern;
mod production;
mod statement;

pub use buffer::Buffer;
pub use chunk::{
    is_internal_chunk_name, is_reserved_chunk_name, Chunk, ChunkError, BUFFER_STATUSES,
    IMPLICIT_CHUNK_SLOT, IMPLICIT_CHUNK_TYPE, INTERNAL_CHUNK_PREFIX, MEMORY_STATUSES,
    STATUS_CHUNK_NAME, STATUS_SLOT_NAME,
};
pub use model::{GlobalConfig, Initializer, LogLevel, Model, Similarity};
pub use modules::{BufferConflict, Module, ModuleKind, UnknownModule};
pub use params::{Param, ParamError, ParamValue};
pub use pattern::{Comparison, Constraint, Pattern, PatternSlot, PatternVar, SlotValue, Value};
pub use production::{Match, Production, VarIndex};
pub use statement::{
    ClearStatement, PrintStatement, RecallStatement, SetSlot, SetStatement, SetTarget, Statement,
};

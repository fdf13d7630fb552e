use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the pseudo-chunk used to query the state of a buffer or of a memory.
pub const STATUS_CHUNK_NAME: &str = "_status";

/// Name of the only slot of [`STATUS_CHUNK_NAME`].
pub const STATUS_SLOT_NAME: &str = "status";

/// Chunk names starting with this prefix are reserved for internal use.
pub const INTERNAL_CHUNK_PREFIX: &str = "_";

/// Chunk names that cannot be declared by the model.
const RESERVED_CHUNK_NAMES: &[&str] = &[STATUS_CHUNK_NAME];

/// Name and slot of the chunk type used by the renderers for the implicit chunks.
pub const IMPLICIT_CHUNK_TYPE: &str = "chunk";
pub const IMPLICIT_CHUNK_SLOT: &str = "value";

/// The states that can be tested on a buffer with a `_status` pattern.
pub const BUFFER_STATUSES: &[&str] = &["full", "empty"];

/// The states that can be tested on a memory with a `_status` pattern.
pub const MEMORY_STATUSES: &[&str] = &["busy", "free", "error"];

/// Whether the chunk name is an internal one (e.g. `_status`).
pub fn is_internal_chunk_name(name: &str) -> bool {
    name.starts_with(INTERNAL_CHUNK_PREFIX)
}

/// Whether the chunk name is explicitly reserved.
pub fn is_reserved_chunk_name(name: &str) -> bool {
    RESERVED_CHUNK_NAMES.contains(&name)
}

/// A chunk type declaration: a named record with an ordered list of slots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chunk {
    /// The name of the chunk type.
    pub type_name: String,
    /// The names of the slots, in declaration order.
    pub slot_names: Vec<String>,
    /// The line of the amod source where the chunk is declared, 0 for the internal ones.
    pub line: usize,
}

impl Chunk {
    pub fn new<S: Into<String>>(type_name: S, slot_names: Vec<String>, line: usize) -> Self {
        Self {
            type_name: type_name.into(),
            slot_names,
            line,
        }
    }

    /// The `_status` pseudo-chunk, available in every model.
    pub fn status() -> Self {
        Self::new(STATUS_CHUNK_NAME, vec![STATUS_SLOT_NAME.to_string()], 0)
    }

    /// The single-slot chunk type the renderers declare the implicit chunks with.
    pub fn implicit() -> Self {
        Self::new(IMPLICIT_CHUNK_TYPE, vec![IMPLICIT_CHUNK_SLOT.to_string()], 0)
    }

    pub fn num_slots(&self) -> usize {
        self.slot_names.len()
    }

    pub fn is_internal(&self) -> bool {
        is_internal_chunk_name(&self.type_name)
    }

    /// Position of the slot with the given name.
    pub fn slot_index(&self, slot_name: &str) -> Option<usize> {
        self.slot_names.iter().position(|s| s == slot_name)
    }

    pub fn has_slot(&self, slot_name: &str) -> bool {
        self.slot_index(slot_name).is_some()
    }

    pub fn slot_name(&self, index: usize) -> Option<&str> {
        self.slot_names.get(index).map(String::as_str)
    }
}

/// Reasons why a chunk declaration is rejected by the model.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChunkError {
    #[error("cannot use reserved chunk name '{0}' (chunks beginning with '_' are reserved)")]
    Internal(String),
    #[error("cannot use reserved chunk name '{0}'")]
    Reserved(String),
    #[error("duplicate chunk name: '{0}'")]
    Duplicate(String),
}

#[cfg(test)]
mod tests {
    use speculoos::prelude::*;

    use super::*;

    #[test]
    fn test_reserved_names() {
        assert_that(&is_internal_chunk_name("_secret")).is_true();
        assert_that(&is_internal_chunk_name("secret_")).is_false();
        assert_that(&is_reserved_chunk_name("_status")).is_true();
        assert_that(&is_reserved_chunk_name("status")).is_false();
    }

    #[test]
    fn test_slot_lookup() {
        let chunk = Chunk::new("count", vec!["first".into(), "second".into()], 4);
        assert_that(&chunk.num_slots()).is_equal_to(2);
        assert_that(&chunk.slot_index("second")).is_equal_to(Some(1));
        assert_that(&chunk.slot_index("third")).is_none();
        assert_that(&chunk.slot_name(0)).is_equal_to(Some("first"));
        assert_that(&chunk.is_internal()).is_false();
    }

    #[test]
    fn test_status_chunk() {
        let status = Chunk::status();
        assert_that(&status.is_internal()).is_true();
        assert_that(&status.num_slots()).is_equal_to(1);
    }
}

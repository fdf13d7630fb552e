use serde::{Deserialize, Serialize};

use crate::modules::ModuleKind;

/// The communication slot of a module. It holds at most one chunk at a time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Buffer {
    pub name: String,
    /// The module owning the buffer.
    pub module: ModuleKind,
}

impl Buffer {
    pub fn new<S: Into<String>>(name: S, module: ModuleKind) -> Self {
        Self {
            name: name.into(),
            module,
        }
    }

    /// Whether the buffer can hold only a single initial chunk.
    pub fn is_single_chunk(&self) -> bool {
        self.module != ModuleKind::Memory
    }
}

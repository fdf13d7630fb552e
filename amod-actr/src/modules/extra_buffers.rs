use serde::{Deserialize, Serialize};

use crate::modules::{Module, ModuleKind};
use crate::params::{Param, ParamError};

/// Additional goal-style buffers declared by the model, one per field of the module block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraBuffers {
    buffers: Vec<String>,
}

impl ExtraBuffers {
    pub fn add_buffer<S: Into<String>>(&mut self, name: S) {
        self.buffers.push(name.into());
    }
}

impl Module for ExtraBuffers {
    fn kind(&self) -> ModuleKind {
        ModuleKind::ExtraBuffers
    }

    fn buffer_names(&self) -> Vec<&str> {
        self.buffers.iter().map(String::as_str).collect()
    }

    /// Every field declares a buffer: `name {}`.
    fn set_param(&mut self, param: &Param) -> Result<(), ParamError> {
        if !param.as_fields()?.is_empty() {
            return Err(ParamError::InvalidType { expected: "{}" });
        }
        if self.has_buffer(&param.key) {
            return Err(ParamError::BufferExists);
        }
        self.add_buffer(param.key.as_str());
        Ok(())
    }
}

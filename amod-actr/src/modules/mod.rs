//! The modules of the cognitive architecture, each one with its own typed parameters.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::params::{Param, ParamError};

mod extra_buffers;
mod goal;
mod imaginal;
mod memory;
mod procedural;

pub use extra_buffers::ExtraBuffers;
pub use goal::Goal;
pub use imaginal::Imaginal;
pub use memory::Memory;
pub use procedural::Procedural;

/// The closed set of the modules a model can configure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModuleKind {
    Goal,
    Memory,
    Procedural,
    Imaginal,
    ExtraBuffers,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 5] = [
        ModuleKind::Goal,
        ModuleKind::Memory,
        ModuleKind::Procedural,
        ModuleKind::Imaginal,
        ModuleKind::ExtraBuffers,
    ];

    /// The name of the module, as written in the `modules` section.
    pub fn name(&self) -> &'static str {
        match self {
            ModuleKind::Goal => "goal",
            ModuleKind::Memory => "memory",
            ModuleKind::Procedural => "procedural",
            ModuleKind::Imaginal => "imaginal",
            ModuleKind::ExtraBuffers => "extra_buffers",
        }
    }
}

impl Display for ModuleKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unrecognized module in config: '{0}'")]
pub struct UnknownModule(pub String);

/// A module declared after another module already took the name of one of its buffers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("buffer '{buffer}' of module '{module}' already exists")]
pub struct BufferConflict {
    pub module: ModuleKind,
    pub buffer: String,
}

impl FromStr for ModuleKind {
    type Err = UnknownModule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModuleKind::ALL
            .iter()
            .find(|kind| kind.name() == s)
            .copied()
            .ok_or_else(|| UnknownModule(s.to_string()))
    }
}

/// Common interface of the modules.
pub trait Module {
    fn kind(&self) -> ModuleKind;

    fn module_name(&self) -> &'static str {
        self.kind().name()
    }

    /// The names of the buffers owned by this module, possibly none.
    fn buffer_names(&self) -> Vec<&str>;

    /// Apply a parameter from the `modules` section, validating its value.
    fn set_param(&mut self, param: &Param) -> Result<(), ParamError>;

    /// The only buffer of the module, if it owns exactly one.
    fn only_buffer(&self) -> Option<&str> {
        match self.buffer_names().as_slice() {
            [buffer] => Some(*buffer),
            _ => None,
        }
    }

    fn has_buffer(&self, name: &str) -> bool {
        self.buffer_names().contains(&name)
    }
}

#[cfg(test)]
mod tests {
    use speculoos::prelude::*;

    use super::*;

    #[test]
    fn test_module_kind_from_str() {
        assert_that(&"goal".parse::<ModuleKind>()).is_ok_containing(ModuleKind::Goal);
        assert_that(&"extra_buffers".parse::<ModuleKind>())
            .is_ok_containing(ModuleKind::ExtraBuffers);
        let err = "Goal".parse::<ModuleKind>().unwrap_err();
        assert_that(&err.to_string())
            .is_equal_to("unrecognized module in config: 'Goal'".to_string());
    }

    #[test]
    fn test_only_buffer() {
        assert_that(&Goal::default().only_buffer()).is_equal_to(Some("goal"));
        assert_that(&Procedural::default().only_buffer()).is_none();
        let mut extra = ExtraBuffers::default();
        extra.add_buffer("first");
        extra.add_buffer("second");
        assert_that(&extra.only_buffer()).is_none();
        assert_that(&extra.has_buffer("second")).is_true();
    }
}

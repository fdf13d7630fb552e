use serde::{Deserialize, Serialize};

use crate::modules::{Module, ModuleKind};
use crate::params::{Param, ParamError};

pub const IMAGINAL_BUFFER_NAME: &str = "imaginal";

/// The imaginal module, a scratch pad for the current problem representation. It only exists
/// if the model declares it in the `modules` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Imaginal {
    /// Time it takes to create a chunk in the buffer, in seconds.
    pub delay: Option<f64>,
}

impl Module for Imaginal {
    fn kind(&self) -> ModuleKind {
        ModuleKind::Imaginal
    }

    fn buffer_names(&self) -> Vec<&str> {
        vec![IMAGINAL_BUFFER_NAME]
    }

    fn set_param(&mut self, param: &Param) -> Result<(), ParamError> {
        match param.key.as_str() {
            "delay" => {
                self.delay = Some(param.as_positive_number()?);
            }
            _ => return Err(ParamError::Unrecognized),
        }
        Ok(())
    }
}

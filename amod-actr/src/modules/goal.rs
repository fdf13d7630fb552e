use serde::{Deserialize, Serialize};

use crate::modules::{Module, ModuleKind};
use crate::params::{Param, ParamError};

pub const GOAL_BUFFER_NAME: &str = "goal";

/// The goal module, holding the current intention of the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Source spreading activation from the goal buffer.
    pub spreading_activation: Option<f64>,
}

impl Module for Goal {
    fn kind(&self) -> ModuleKind {
        ModuleKind::Goal
    }

    fn buffer_names(&self) -> Vec<&str> {
        vec![GOAL_BUFFER_NAME]
    }

    fn set_param(&mut self, param: &Param) -> Result<(), ParamError> {
        match param.key.as_str() {
            "spreading_activation" => {
                self.spreading_activation = Some(param.as_number()?);
            }
            _ => return Err(ParamError::Unrecognized),
        }
        Ok(())
    }
}

use serde::{Deserialize, Serialize};

use crate::modules::{Module, ModuleKind};
use crate::params::{Param, ParamError};

/// The procedural module, which selects and fires the productions. It has no buffer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Procedural {
    /// Time it takes to fire a production, in seconds.
    pub default_action_time: Option<f64>,
}

impl Module for Procedural {
    fn kind(&self) -> ModuleKind {
        ModuleKind::Procedural
    }

    fn buffer_names(&self) -> Vec<&str> {
        vec![]
    }

    fn set_param(&mut self, param: &Param) -> Result<(), ParamError> {
        match param.key.as_str() {
            "default_action_time" => {
                self.default_action_time = Some(param.as_positive_number()?);
            }
            _ => return Err(ParamError::Unrecognized),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use speculoos::prelude::*;

    use super::*;
    use crate::params::ParamValue;

    #[test]
    fn test_default_action_time() {
        let mut procedural = Procedural::default();
        let param = Param::new("default_action_time", ParamValue::Number(0.05));
        assert_that(&procedural.set_param(&param)).is_ok();
        assert_that(&procedural.default_action_time).is_equal_to(Some(0.05));

        let param = Param::new("default_action_time", ParamValue::Number(-1.0));
        assert_that(&procedural.set_param(&param)).is_err_containing(ParamError::MustBePositive);
        assert_that(&procedural.default_action_time).is_equal_to(Some(0.05));
    }
}

use serde::{Deserialize, Serialize};

use crate::modules::{Module, ModuleKind};
use crate::params::{Param, ParamError};

pub const MEMORY_BUFFER_NAME: &str = "retrieval";

/// The declarative memory module, queried through its `retrieval` buffer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    /// Scales the time it takes to retrieve a chunk.
    pub latency_factor: Option<f64>,
    /// Scales the effect of the activation on the retrieval time.
    pub latency_exponent: Option<f64>,
    /// Minimum activation for a chunk to be retrieved.
    pub retrieval_threshold: Option<f64>,
    /// Maximum associative strength used by the spreading activation.
    pub max_spread_strength: Option<f64>,
    /// Noise added to the activation of every retrieval.
    pub instantaneous_noise: Option<f64>,
    /// Penalty for the mismatch of a slot in partial matching.
    pub mismatch_penalty: Option<f64>,
    /// Decay of the base-level learning, in `[0, 1]`.
    pub decay: Option<f64>,
    /// Number of finsts, the chunks marked as recently retrieved.
    pub finst_size: Option<u64>,
    /// How long a finst lasts, in seconds.
    pub finst_time: Option<f64>,
}

impl Module for Memory {
    fn kind(&self) -> ModuleKind {
        ModuleKind::Memory
    }

    fn buffer_names(&self) -> Vec<&str> {
        vec![MEMORY_BUFFER_NAME]
    }

    fn set_param(&mut self, param: &Param) -> Result<(), ParamError> {
        match param.key.as_str() {
            "latency_factor" => self.latency_factor = Some(param.as_positive_number()?),
            "latency_exponent" => self.latency_exponent = Some(param.as_positive_number()?),
            "retrieval_threshold" => self.retrieval_threshold = Some(param.as_number()?),
            "max_spread_strength" => {
                self.max_spread_strength = Some(param.as_positive_number()?)
            }
            "instantaneous_noise" => {
                self.instantaneous_noise = Some(param.as_positive_number()?)
            }
            "mismatch_penalty" => self.mismatch_penalty = Some(param.as_positive_number()?),
            "decay" => self.decay = Some(param.as_number_in_range(0.0, 1.0)?),
            "finst_size" => self.finst_size = Some(param.as_positive_int()?),
            "finst_time" => self.finst_time = Some(param.as_positive_number()?),
            _ => return Err(ParamError::Unrecognized),
        }
        Ok(())
    }
}

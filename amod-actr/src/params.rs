use std::fmt::{Display, Formatter};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The value of a configuration field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    /// A bare identifier, e.g. `true` or `min`.
    Id(String),
    /// A quoted string.
    Str(String),
    /// A numeric literal.
    Number(f64),
    /// A nested block of fields, e.g. `foo { bar: 1 }` or the empty block `foo {}`.
    Fields(Vec<Param>),
}

impl ParamValue {
    /// Short human description of the kind of value, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Id(_) => "identifier",
            ParamValue::Str(_) => "string",
            ParamValue::Number(_) => "number",
            ParamValue::Fields(_) => "block",
        }
    }
}

impl Display for ParamValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Id(id) => write!(f, "{}", id),
            ParamValue::Str(s) => write!(f, "'{}'", s),
            ParamValue::Number(n) => write!(f, "{}", n),
            ParamValue::Fields(fields) => {
                write!(f, "{{ {} }}", fields.iter().map(|p| p.to_string()).join(" "))
            }
        }
    }
}

/// A typed configuration field, applied to a module or to the global settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub key: String,
    pub value: ParamValue,
}

impl Display for Param {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            ParamValue::Fields(_) => write!(f, "{} {}", self.key, self.value),
            value => write!(f, "{}: {}", self.key, value),
        }
    }
}

/// Reasons why a parameter cannot be applied.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParamError {
    /// The value has the wrong type.
    #[error("invalid type (expected {expected})")]
    InvalidType { expected: &'static str },
    /// The value is not one of the accepted identifiers.
    #[error("invalid option (expected one of: {})", .options.join(", "))]
    InvalidOption { options: Vec<&'static str> },
    #[error("must be a positive number")]
    MustBePositive,
    #[error("is out of range ({min}-{max})")]
    OutOfRange { min: f64, max: f64 },
    /// The key is not known by the target of the parameter.
    #[error("unrecognized parameter")]
    Unrecognized,
    /// An extra buffer with the name of an already existing buffer.
    #[error("buffer already exists")]
    BufferExists,
}

impl ParamError {
    /// Whether the error is caused by the value of the parameter, rather than by its key.
    pub fn is_value_error(&self) -> bool {
        matches!(
            self,
            ParamError::InvalidType { .. }
                | ParamError::InvalidOption { .. }
                | ParamError::MustBePositive
                | ParamError::OutOfRange { .. }
        )
    }
}

impl Param {
    pub fn new<S: Into<String>>(key: S, value: ParamValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn as_number(&self) -> Result<f64, ParamError> {
        match self.value {
            ParamValue::Number(n) => Ok(n),
            _ => Err(ParamError::InvalidType { expected: "number" }),
        }
    }

    /// A number strictly greater than zero.
    pub fn as_positive_number(&self) -> Result<f64, ParamError> {
        let n = self.as_number()?;
        if n <= 0.0 {
            return Err(ParamError::MustBePositive);
        }
        Ok(n)
    }

    /// A number inside `min..=max`.
    pub fn as_number_in_range(&self, min: f64, max: f64) -> Result<f64, ParamError> {
        let n = self.as_number()?;
        if n < min || n > max {
            return Err(ParamError::OutOfRange { min, max });
        }
        Ok(n)
    }

    /// An integer number greater than or equal to zero.
    pub fn as_unsigned(&self) -> Result<u64, ParamError> {
        let n = self.as_number()?;
        if n.fract() != 0.0 || n < 0.0 || n > u64::MAX as f64 {
            return Err(ParamError::InvalidType {
                expected: "non-negative integer",
            });
        }
        Ok(n as u64)
    }

    /// An integer number strictly greater than zero.
    pub fn as_positive_int(&self) -> Result<u64, ParamError> {
        let n = self.as_number()?;
        if n.fract() != 0.0 {
            return Err(ParamError::InvalidType {
                expected: "positive integer",
            });
        }
        if n <= 0.0 {
            return Err(ParamError::MustBePositive);
        }
        Ok(n as u64)
    }

    /// Either the identifier `true` or `false`.
    pub fn as_bool(&self) -> Result<bool, ParamError> {
        match &self.value {
            ParamValue::Id(id) if id == "true" => Ok(true),
            ParamValue::Id(id) if id == "false" => Ok(false),
            _ => Err(ParamError::InvalidType {
                expected: "true or false",
            }),
        }
    }

    /// One of the given identifiers (or strings).
    pub fn as_option(&self, options: &[&'static str]) -> Result<&'static str, ParamError> {
        let value = match &self.value {
            ParamValue::Id(s) | ParamValue::Str(s) => s,
            _ => {
                return Err(ParamError::InvalidOption {
                    options: options.to_vec(),
                })
            }
        };
        options
            .iter()
            .find(|option| **option == value.as_str())
            .copied()
            .ok_or_else(|| ParamError::InvalidOption {
                options: options.to_vec(),
            })
    }

    /// A nested block of fields.
    pub fn as_fields(&self) -> Result<&[Param], ParamError> {
        match &self.value {
            ParamValue::Fields(fields) => Ok(fields),
            _ => Err(ParamError::InvalidType { expected: "{}" }),
        }
    }
}

#[cfg(test)]
mod tests {
    use speculoos::prelude::*;

    use super::*;

    fn number(n: f64) -> Param {
        Param::new("key", ParamValue::Number(n))
    }

    fn id(s: &str) -> Param {
        Param::new("key", ParamValue::Id(s.into()))
    }

    #[test]
    fn test_positive_number() {
        assert_that(&number(0.5).as_positive_number()).is_ok_containing(0.5);
        assert_that(&number(0.0).as_positive_number())
            .is_err_containing(ParamError::MustBePositive);
        assert_that(&id("x").as_positive_number())
            .is_err_containing(ParamError::InvalidType { expected: "number" });
    }

    #[test]
    fn test_range() {
        assert_that(&number(1.0).as_number_in_range(0.0, 1.0)).is_ok_containing(1.0);
        let err = number(1.5).as_number_in_range(0.0, 1.0).unwrap_err();
        assert_that(&err.to_string()).is_equal_to("is out of range (0-1)".to_string());
        assert_that(&err.is_value_error()).is_true();
    }

    #[test]
    fn test_integers() {
        assert_that(&number(42.0).as_unsigned()).is_ok_containing(42);
        assert_that(&number(0.0).as_unsigned()).is_ok_containing(0);
        assert_that(&number(-1.0).as_unsigned()).is_err();
        assert_that(&number(1.5).as_unsigned()).is_err();
        assert_that(&number(0.0).as_positive_int())
            .is_err_containing(ParamError::MustBePositive);
        assert_that(&number(3.0).as_positive_int()).is_ok_containing(3);
    }

    #[test]
    fn test_bool_and_options() {
        assert_that(&id("true").as_bool()).is_ok_containing(true);
        assert_that(&id("false").as_bool()).is_ok_containing(false);
        assert_that(&number(1.0).as_bool()).is_err();
        assert_that(&id("min").as_option(&["min", "info"])).is_ok_containing("min");
        let err = id("max").as_option(&["min", "info"]).unwrap_err();
        assert_that(&err.to_string())
            .is_equal_to("invalid option (expected one of: min, info)".to_string());
    }

    #[test]
    fn test_unrecognized_is_not_a_value_error() {
        assert_that(&ParamError::Unrecognized.is_value_error()).is_false();
        assert_that(&ParamError::BufferExists.is_value_error()).is_false();
    }

    #[test]
    fn test_display() {
        let block = Param::new(
            "outer",
            ParamValue::Fields(vec![Param::new("inner", ParamValue::Str("x".into()))]),
        );
        assert_that(&block.to_string()).is_equal_to("outer { inner: 'x' }".to_string());
    }
}

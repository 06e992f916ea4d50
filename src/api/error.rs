use thiserror::Error;

use crate::core::InputField;

#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error(
        "profit, owner's pay and tax exceed 100% of real revenue \
         (operating expenses at {op_expenses_percent:.2}%)"
    )]
    AllocationsExceedTotal { op_expenses_percent: f64 },
}

impl InputError {
    pub(crate) fn check(field: InputField, value: f64) -> Result<f64, InputError> {
        if !value.is_finite() {
            return Err(InputError::NotFinite {
                field: field.name(),
            });
        }
        let (min, max) = field.bounds();
        if !(min..=max).contains(&value) {
            return Err(InputError::OutOfRange {
                field: field.name(),
                min,
                max,
                value,
            });
        }
        Ok(value)
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid bind address: {0}")]
    Addr(#[from] std::net::AddrParseError),
}

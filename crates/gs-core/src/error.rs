use thiserror::Error;

pub type GsResult<T> = Result<T, GsError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GsError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Value out of range for {what}: {value} not in [{min}, {max}]")]
    OutOfRange {
        what: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

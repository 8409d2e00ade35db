//! Configuration errors

use thiserror::Error;

/// Errors raised while loading or parsing options
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    #[error("could not read options file: {0}")]
    IoError(String),

    #[error("malformed options line: {0}")]
    ParseError(String),

    #[error("unknown option: {0}")]
    UnknownOption(String),

    #[error("invalid value for option {0}: {1}")]
    InvalidValue(String, String),

    #[error("option {0} needs a value")]
    MissingValue(String),
}

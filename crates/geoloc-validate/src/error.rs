use thiserror::Error;

/// Why a variable list failed civic or GML validation.
///
/// Variants that concern a particular variable or attribute carry its name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing 'type' variable")]
    MissingType,

    #[error("invalid shape type '{0}'")]
    InvalidType(String),

    #[error("invalid variable name '{0}'")]
    InvalidVarname(String),

    #[error("invalid value for '{0}'")]
    InvalidValue(String),

    #[error("not enough occurrences of '{0}'")]
    NotEnoughVarnames(String),

    #[error("too many occurrences of '{0}'")]
    TooManyVarnames(String),
}

impl ValidationError {
    /// The variable or attribute the failure refers to, if any.
    pub fn item(&self) -> Option<&str> {
        match self {
            ValidationError::MissingType => None,
            ValidationError::InvalidType(s)
            | ValidationError::InvalidVarname(s)
            | ValidationError::InvalidValue(s)
            | ValidationError::NotEnoughVarnames(s)
            | ValidationError::TooManyVarnames(s) => Some(s),
        }
    }
}

/// Result type for validators
pub type Result<T> = std::result::Result<T, ValidationError>;

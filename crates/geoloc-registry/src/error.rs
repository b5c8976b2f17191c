//! Registry error types

use geoloc_types::{ParseKindError, VariableListError};
use geoloc_validate::ValidationError;
use thiserror::Error;

/// Registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Location '{id}' must have a format")]
    MissingFormat { id: String },

    #[error("Location '{id}': {source}")]
    InvalidLocation {
        id: String,
        #[source]
        source: ValidationError,
    },

    #[error("Location '{id}' has format URI but no 'URI' variable in '{location}'")]
    MissingUri { id: String, location: String },

    #[error("Profile '{id}' can't have location_refinement or location_variables without a location_reference")]
    RefinementWithoutReference { id: String },

    #[error("Profile '{id}' has a location_reference '{reference}' that doesn't exist")]
    DanglingReference { id: String, reference: String },

    #[error("Profile '{id}' location_refinement: {source}")]
    InvalidRefinement {
        id: String,
        #[source]
        source: ValidationError,
    },

    #[error("{kind} '{id}': {source}")]
    BadVariables {
        kind: &'static str,
        id: String,
        #[source]
        source: VariableListError,
    },

    #[error("{kind} '{id}': {source}")]
    BadField {
        kind: &'static str,
        id: String,
        #[source]
        source: ParseKindError,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

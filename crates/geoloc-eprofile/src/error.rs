//! Effective profile error types

use geoloc_types::VariableListError;
use thiserror::Error;

/// Errors building or refreshing an effective profile
#[derive(Debug, Error)]
pub enum EprofileError {
    #[error("Profile '{profile}' references location '{location}' that doesn't exist")]
    LocationNotFound { profile: String, location: String },

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Empty location URI")]
    EmptyUri,

    #[error("Malformed Geolocation URI '{0}'")]
    MalformedUri(String),

    #[error("No message body part matches '{0}'")]
    BodyPartNotFound(String),

    #[error("Unable to parse PIDF document: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Document root is not a PIDF presence element")]
    NotPidf,

    #[error("{reference}: no device, tuple or person element carries a location")]
    NoLocation { reference: String },

    #[error("{reference}: Unknown format '{format}'")]
    UnknownFormat { reference: String, format: String },

    #[error("{reference}: Unable to create location variables from '{text}': {source}")]
    InvalidLocationInfo {
        reference: String,
        text: String,
        #[source]
        source: VariableListError,
    },

    #[error("{reference}: location-info carries no location variables")]
    EmptyLocationInfo { reference: String },
}

/// Result type for effective profile operations
pub type Result<T> = std::result::Result<T, EprofileError>;

//! Administratively configured location and profile records.

use serde::{Deserialize, Serialize};

use crate::kinds::{Disposition, LocationFormat, PidfElement};
use crate::variables::VariableList;

/// A named, stored location: a format tag plus the location data.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRecord {
    /// Unique name
    pub id: String,
    pub format: LocationFormat,
    /// Location data (civic fields, shape attributes or a single `URI`)
    pub location: VariableList,
}

impl LocationRecord {
    pub fn new(id: impl Into<String>, format: LocationFormat, location: VariableList) -> Self {
        Self {
            id: id.into(),
            format,
            location,
        }
    }
}

/// A named profile: which location to use and how to treat signaled ones.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// Unique name
    pub id: String,
    /// Name of a [`LocationRecord`]; empty when the profile has none
    pub location_reference: String,
    pub pidf_element: PidfElement,
    pub disposition: Disposition,
    pub geolocation_routing: bool,
    pub send_location: bool,
    /// Overrides applied on top of the referenced location
    pub location_refinement: VariableList,
    /// Extra variables carried along with the location
    pub location_variables: VariableList,
    pub usage_rules: VariableList,
}

impl ProfileRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_location_reference(mut self, reference: impl Into<String>) -> Self {
        self.location_reference = reference.into();
        self
    }

    pub fn with_disposition(mut self, disposition: Disposition) -> Self {
        self.disposition = disposition;
        self
    }

    pub fn with_refinement(mut self, refinement: VariableList) -> Self {
        self.location_refinement = refinement;
        self
    }

    pub fn with_send_location(mut self, send: bool) -> Self {
        self.send_location = send;
        self
    }

    pub fn has_location_reference(&self) -> bool {
        !self.location_reference.is_empty()
    }
}

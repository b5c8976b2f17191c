//! Admission rules for records entering the registry.

use std::sync::Arc;

use geoloc_types::{LocationFormat, LocationRecord, ProfileRecord};
use geoloc_validate::{validate_civic, validate_gml};

use crate::error::{RegistryError, Result};

/// A location must have a format and data valid for that format.
pub fn validate_location(location: &LocationRecord) -> Result<()> {
    let invalid = |source| RegistryError::InvalidLocation {
        id: location.id.clone(),
        source,
    };
    match location.format {
        LocationFormat::None => Err(RegistryError::MissingFormat {
            id: location.id.clone(),
        }),
        LocationFormat::CivicAddress => validate_civic(&location.location).map_err(invalid),
        LocationFormat::Gml => validate_gml(&location.location).map_err(invalid),
        LocationFormat::Uri => {
            if location.location.contains("URI") {
                Ok(())
            } else {
                Err(RegistryError::MissingUri {
                    id: location.id.clone(),
                    location: location.location.to_string(),
                })
            }
        }
    }
}

/// A profile's location reference must resolve through `lookup`, and a
/// civicAddress location's refinement must itself be valid civic data.
pub fn validate_profile<F>(profile: &ProfileRecord, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<Arc<LocationRecord>>,
{
    if !profile.has_location_reference() {
        if !profile.location_refinement.is_empty() || !profile.location_variables.is_empty() {
            return Err(RegistryError::RefinementWithoutReference {
                id: profile.id.clone(),
            });
        }
        return Ok(());
    }

    let location =
        lookup(&profile.location_reference).ok_or_else(|| RegistryError::DanglingReference {
            id: profile.id.clone(),
            reference: profile.location_reference.clone(),
        })?;

    if location.format == LocationFormat::CivicAddress {
        validate_civic(&profile.location_refinement).map_err(|source| {
            RegistryError::InvalidRefinement {
                id: profile.id.clone(),
                source,
            }
        })?;
    }
    Ok(())
}

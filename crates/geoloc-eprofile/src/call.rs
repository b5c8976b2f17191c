//! Effective profiles attached to a call.

use geoloc_registry::GeolocRegistry;

use crate::effective::EffectiveProfile;
use crate::error::Result;
use crate::shared::SharedEffectiveProfile;

/// Ordered list of effective profiles for one call leg.
///
/// Order is precedence: the first entry is the preferred location. An empty
/// list means no location is available for the call.
#[derive(Clone, Debug, Default)]
pub struct CallLocations {
    profiles: Vec<SharedEffectiveProfile>,
}

impl CallLocations {
    pub fn new() -> Self {
        Self::default()
    }

    /// A list holding the effective profile built from a named profile.
    pub fn from_profile_name(registry: &dyn GeolocRegistry, name: &str) -> Result<Self> {
        let mut locations = Self::new();
        locations.push(EffectiveProfile::from_profile_name(name, registry)?);
        Ok(locations)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SharedEffectiveProfile> {
        self.profiles.get(index)
    }

    /// Append a profile, returning the new length.
    pub fn push(&mut self, profile: impl Into<SharedEffectiveProfile>) -> usize {
        self.profiles.push(profile.into());
        self.profiles.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SharedEffectiveProfile> {
        self.profiles.iter()
    }

    /// Ids in list order.
    pub fn ids(&self) -> Vec<String> {
        self.profiles.iter().map(SharedEffectiveProfile::id).collect()
    }
}

impl<'a> IntoIterator for &'a CallLocations {
    type Item = &'a SharedEffectiveProfile;
    type IntoIter = std::slice::Iter<'a, SharedEffectiveProfile>;

    fn into_iter(self) -> Self::IntoIter {
        self.profiles.iter()
    }
}

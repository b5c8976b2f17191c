//! In-memory registry backed by `DashMap`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use geoloc_types::{LocationRecord, ProfileRecord};
use tracing::{error, info};

use crate::config::GeolocationConfig;
use crate::error::{RegistryError, Result};
use crate::registry::GeolocRegistry;
use crate::schema::{validate_location, validate_profile};

/// Kind of record named in a [`LoadReport`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordKind {
    Location,
    Profile,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Location => f.write_str("location"),
            RecordKind::Profile => f.write_str("profile"),
        }
    }
}

/// A record that was refused admission.
#[derive(Clone, Debug)]
pub struct Rejection {
    pub kind: RecordKind,
    pub id: String,
    pub reason: String,
}

/// Outcome of loading a configuration.
#[derive(Clone, Debug, Default)]
pub struct LoadReport {
    pub locations: usize,
    pub profiles: usize,
    pub rejected: Vec<Rejection>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }

    fn reject(&mut self, kind: RecordKind, id: &str, err: &RegistryError) {
        error!(kind = %kind, id, error = %err, "Geolocation record rejected");
        self.rejected.push(Rejection {
            kind,
            id: id.to_string(),
            reason: err.to_string(),
        });
    }
}

/// In-memory location/profile registry
pub struct InMemoryGeolocRegistry {
    locations: DashMap<String, Arc<LocationRecord>>,
    profiles: DashMap<String, Arc<ProfileRecord>>,
}

impl InMemoryGeolocRegistry {
    pub fn new() -> Self {
        Self {
            locations: DashMap::new(),
            profiles: DashMap::new(),
        }
    }

    /// Build a registry from a configuration.
    pub fn from_config(config: &GeolocationConfig) -> (Self, LoadReport) {
        let registry = Self::new();
        let report = registry.reload(config);
        (registry, report)
    }

    /// Replace the registry contents with the records in `config`.
    ///
    /// Locations are admitted first, then profiles are checked against the
    /// newly admitted locations. Each record is accepted or rejected on its
    /// own; records absent from `config` are dropped.
    pub fn reload(&self, config: &GeolocationConfig) -> LoadReport {
        let mut report = LoadReport::default();

        let mut locations: HashMap<String, Arc<LocationRecord>> = HashMap::new();
        for entry in &config.location {
            let admitted = entry.to_record().and_then(|record| {
                if locations.contains_key(&record.id) {
                    return Err(RegistryError::Config(format!(
                        "duplicate location id '{}'",
                        record.id
                    )));
                }
                validate_location(&record)?;
                Ok(record)
            });
            match admitted {
                Ok(record) => {
                    locations.insert(record.id.clone(), Arc::new(record));
                }
                Err(e) => report.reject(RecordKind::Location, &entry.id, &e),
            }
        }

        let mut profiles: HashMap<String, Arc<ProfileRecord>> = HashMap::new();
        for entry in &config.profile {
            let admitted = entry.to_record().and_then(|record| {
                if profiles.contains_key(&record.id) {
                    return Err(RegistryError::Config(format!(
                        "duplicate profile id '{}'",
                        record.id
                    )));
                }
                validate_profile(&record, |id| locations.get(id).cloned())?;
                Ok(record)
            });
            match admitted {
                Ok(record) => {
                    profiles.insert(record.id.clone(), Arc::new(record));
                }
                Err(e) => report.reject(RecordKind::Profile, &entry.id, &e),
            }
        }

        report.locations = locations.len();
        report.profiles = profiles.len();

        self.locations.retain(|id, _| locations.contains_key(id));
        for (id, record) in locations {
            self.locations.insert(id, record);
        }
        self.profiles.retain(|id, _| profiles.contains_key(id));
        for (id, record) in profiles {
            self.profiles.insert(id, record);
        }

        info!(
            locations = report.locations,
            profiles = report.profiles,
            rejected = report.rejected.len(),
            "Geolocation configuration loaded"
        );
        report
    }

    pub fn remove_location(&self, id: &str) -> Option<Arc<LocationRecord>> {
        self.locations.remove(id).map(|(_, record)| record)
    }

    pub fn remove_profile(&self, id: &str) -> Option<Arc<ProfileRecord>> {
        self.profiles.remove(id).map(|(_, record)| record)
    }
}

impl Default for InMemoryGeolocRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GeolocRegistry for InMemoryGeolocRegistry {
    fn get_location(&self, id: &str) -> Option<Arc<LocationRecord>> {
        self.locations.get(id).map(|r| Arc::clone(r.value()))
    }

    fn get_profile(&self, id: &str) -> Option<Arc<ProfileRecord>> {
        self.profiles.get(id).map(|r| Arc::clone(r.value()))
    }

    fn put_location(&self, location: LocationRecord) -> Result<()> {
        validate_location(&location)?;
        self.locations
            .insert(location.id.clone(), Arc::new(location));
        Ok(())
    }

    fn put_profile(&self, profile: ProfileRecord) -> Result<()> {
        validate_profile(&profile, |id| self.get_location(id))?;
        self.profiles.insert(profile.id.clone(), Arc::new(profile));
        Ok(())
    }

    fn location_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.locations.iter().map(|r| r.key().clone()).collect();
        ids.sort();
        ids
    }

    fn profile_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.profiles.iter().map(|r| r.key().clone()).collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoloc_types::{LocationFormat, VariableList};

    const CONFIG: &str = r#"
[[location]]
id = "office"
format = "civicAddress"
location = "country=AU, A1=NSW, city=Wollongong"

[[location]]
id = "no-format"
location = "country=AU"

[[location]]
id = "bad-circle"
format = "GML"
location = 'type=Circle, pos="1 2"'

[[profile]]
id = "good"
location_reference = "office"
location_refinement = "FLR=4"

[[profile]]
id = "dangling"
location_reference = "bad-circle"

[[profile]]
id = "bad-refinement"
location_reference = "office"
location_refinement = "bogus_field=1"
"#;

    fn loaded() -> (InMemoryGeolocRegistry, LoadReport) {
        let config = GeolocationConfig::from_toml_str(CONFIG).unwrap();
        InMemoryGeolocRegistry::from_config(&config)
    }

    #[test]
    fn bad_records_do_not_stop_loading() {
        let (registry, report) = loaded();
        assert_eq!(report.locations, 1);
        assert_eq!(report.profiles, 1);
        assert!(!report.is_clean());

        let rejected: Vec<_> = report
            .rejected
            .iter()
            .map(|r| (r.kind, r.id.as_str()))
            .collect();
        assert_eq!(
            rejected,
            vec![
                (RecordKind::Location, "no-format"),
                (RecordKind::Location, "bad-circle"),
                (RecordKind::Profile, "dangling"),
                (RecordKind::Profile, "bad-refinement"),
            ]
        );

        assert!(registry.get_location("office").is_some());
        assert!(registry.get_profile("good").is_some());
        assert!(registry.get_profile("dangling").is_none());
    }

    #[test]
    fn reload_drops_records_no_longer_configured() {
        let (registry, _) = loaded();
        let smaller = GeolocationConfig::from_toml_str(
            r#"
[[location]]
id = "pin"
format = "GML"
location = 'type=Point, pos="1 2"'
"#,
        )
        .unwrap();
        let report = registry.reload(&smaller);
        assert!(report.is_clean());
        assert_eq!(registry.location_ids(), vec!["pin".to_string()]);
        assert!(registry.profile_ids().is_empty());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let config = GeolocationConfig::from_toml_str(
            r#"
[[location]]
id = "dup"
format = "URI"
location = "URI=http://a"

[[location]]
id = "dup"
format = "URI"
location = "URI=http://b"
"#,
        )
        .unwrap();
        let (registry, report) = InMemoryGeolocRegistry::from_config(&config);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(
            registry.get_location("dup").unwrap().location.find("URI"),
            Some("http://a")
        );
    }

    #[test]
    fn put_validates_before_publishing() {
        let registry = InMemoryGeolocRegistry::new();
        let bad = LocationRecord::new("x", LocationFormat::Uri, VariableList::new());
        assert!(registry.put_location(bad).is_err());
        assert!(registry.get_location("x").is_none());

        let profile = ProfileRecord::new("p").with_location_reference("x");
        assert!(matches!(
            registry.put_profile(profile.clone()),
            Err(RegistryError::DanglingReference { .. })
        ));

        let good = LocationRecord::new(
            "x",
            LocationFormat::Uri,
            [("URI", "http://x")].into_iter().collect(),
        );
        registry.put_location(good).unwrap();
        registry.put_profile(profile).unwrap();
        assert_eq!(registry.profile_ids(), vec!["p".to_string()]);
    }

    #[test]
    fn published_records_are_shared_not_copied() {
        let (registry, _) = loaded();
        let a = registry.get_location("office").unwrap();
        let b = registry.get_location("office").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(registry.remove_location("office").is_some());
        assert_eq!(a.id, "office");
    }
}

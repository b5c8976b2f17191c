//! Geolocation configuration file
//!
//! ```toml
//! [[location]]
//! id = "office"
//! format = "civicAddress"
//! location = 'country=AU, A1=NSW, A3="Wollongong", RD=Flinders, STS=Street'
//!
//! [[profile]]
//! id = "office-profile"
//! location_reference = "office"
//! location_disposition = "prepend"
//! location_refinement = "FLR=4, ROOM=210"
//! send_location = true
//! ```
//!
//! Fields are kept as text here and converted per record, so one bad
//! record is rejected on its own when the configuration is loaded.

use std::path::Path;

use geoloc_types::{LocationRecord, ProfileRecord, VariableList};
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};

/// Parsed geolocation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeolocationConfig {
    #[serde(default)]
    pub location: Vec<LocationConfig>,

    #[serde(default)]
    pub profile: Vec<ProfileConfig>,
}

/// A `[[location]]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationConfig {
    pub id: String,

    /// `civicAddress`, `GML` or `URI`
    #[serde(default)]
    pub format: String,

    /// Variable list text
    #[serde(default)]
    pub location: String,
}

/// A `[[profile]]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub id: String,

    #[serde(default)]
    pub location_reference: String,

    /// `tuple`, `device` or `person`
    #[serde(default)]
    pub pidf_element: String,

    /// `discard` (default), `append`, `prepend` or `replace`
    #[serde(default)]
    pub location_disposition: String,

    #[serde(default)]
    pub geolocation_routing: bool,

    #[serde(default)]
    pub send_location: bool,

    #[serde(default)]
    pub location_refinement: String,

    #[serde(default)]
    pub location_variables: String,

    #[serde(default)]
    pub usage_rules: String,
}

impl GeolocationConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| RegistryError::Config(e.to_string()))
    }

    /// Load configuration from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }
}

fn variables(kind: &'static str, id: &str, text: &str) -> Result<VariableList> {
    VariableList::parse(text).map_err(|source| RegistryError::BadVariables {
        kind,
        id: id.to_string(),
        source,
    })
}

impl LocationConfig {
    /// Convert to a record. Only syntax is checked here; see
    /// [`crate::schema::validate_location`] for the admission rules.
    pub fn to_record(&self) -> Result<LocationRecord> {
        let format = self.format.parse().map_err(|source| RegistryError::BadField {
            kind: "Location",
            id: self.id.clone(),
            source,
        })?;
        Ok(LocationRecord::new(
            self.id.clone(),
            format,
            variables("Location", &self.id, &self.location)?,
        ))
    }
}

impl ProfileConfig {
    /// Convert to a record. Only syntax is checked here; see
    /// [`crate::schema::validate_profile`] for the admission rules.
    pub fn to_record(&self) -> Result<ProfileRecord> {
        let bad_field = |source| RegistryError::BadField {
            kind: "Profile",
            id: self.id.clone(),
            source,
        };
        let disposition = if self.location_disposition.trim().is_empty() {
            Default::default()
        } else {
            self.location_disposition.parse().map_err(bad_field)?
        };
        Ok(ProfileRecord {
            id: self.id.clone(),
            location_reference: self.location_reference.trim().to_string(),
            pidf_element: self.pidf_element.parse().map_err(bad_field)?,
            disposition,
            geolocation_routing: self.geolocation_routing,
            send_location: self.send_location,
            location_refinement: variables("Profile", &self.id, &self.location_refinement)?,
            location_variables: variables("Profile", &self.id, &self.location_variables)?,
            usage_rules: variables("Profile", &self.id, &self.usage_rules)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoloc_types::{Disposition, LocationFormat, PidfElement};
    use std::io::Write;

    const SAMPLE: &str = r#"
[[location]]
id = "office"
format = "civicAddress"
location = 'country=AU, A1=NSW, A3="Wollongong"'

[[location]]
id = "pin"
format = "GML"
location = 'type=Point, pos="-34.410649 150.87651"'

[[profile]]
id = "office-profile"
location_reference = "office"
location_disposition = "prepend"
pidf_element = "device"
location_refinement = "FLR=4"
send_location = true

[[profile]]
id = "bare"
"#;

    #[test]
    fn parses_sample() {
        let config = GeolocationConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.location.len(), 2);
        assert_eq!(config.profile.len(), 2);

        let office = config.location[0].to_record().unwrap();
        assert_eq!(office.format, LocationFormat::CivicAddress);
        assert_eq!(office.location.find("A3"), Some("Wollongong"));

        let profile = config.profile[0].to_record().unwrap();
        assert_eq!(profile.disposition, Disposition::Prepend);
        assert_eq!(profile.pidf_element, PidfElement::Device);
        assert_eq!(profile.location_refinement.find("FLR"), Some("4"));
        assert!(profile.send_location);
    }

    #[test]
    fn profile_defaults() {
        let config = GeolocationConfig::from_toml_str(SAMPLE).unwrap();
        let bare = config.profile[1].to_record().unwrap();
        assert_eq!(bare.disposition, Disposition::Discard);
        assert_eq!(bare.pidf_element, PidfElement::None);
        assert!(!bare.send_location);
        assert!(!bare.has_location_reference());
    }

    #[test]
    fn bad_fields_fail_only_their_record() {
        let config = GeolocationConfig::from_toml_str(
            r#"
[[location]]
id = "bad"
format = "kml"

[[profile]]
id = "broken"
location_disposition = "merge"
"#,
        )
        .unwrap();
        assert!(matches!(
            config.location[0].to_record(),
            Err(RegistryError::BadField { .. })
        ));
        assert!(matches!(
            config.profile[0].to_record(),
            Err(RegistryError::BadField { .. })
        ));
    }

    #[test]
    fn bad_variable_text() {
        let location = LocationConfig {
            id: "x".into(),
            format: "civicAddress".into(),
            location: "country".into(),
        };
        assert!(matches!(
            location.to_record(),
            Err(RegistryError::BadVariables { .. })
        ));
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        assert!(matches!(
            GeolocationConfig::from_toml_str("[[location]\nid="),
            Err(RegistryError::Config(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = GeolocationConfig::load(file.path()).unwrap();
        assert_eq!(config.location[1].id, "pin");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        assert!(matches!(
            GeolocationConfig::load("/nonexistent/geolocation.toml"),
            Err(RegistryError::Io(_))
        ));
    }
}

//! Effective profiles
//!
//! An [`EffectiveProfile`] is the self-contained location record attached to
//! a call. It is built from a configured [`ProfileRecord`], from a bare
//! location URI, or from a signaled PIDF-LO document (see [`crate::pidf`]).
//! Every list it holds is its own copy; nothing it does can reach back into
//! the registry's records.

use geoloc_registry::GeolocRegistry;
use geoloc_types::{Disposition, LocationFormat, PidfElement, ProfileRecord, VariableList};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{EprofileError, Result};

/// A fully resolved location record for one call leg.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveProfile {
    /// Profile name, PIDF element/entity id, or the location URI
    pub id: String,
    pub location_reference: String,
    pub pidf_element: PidfElement,
    pub disposition: Disposition,
    pub geolocation_routing: bool,
    pub send_location: bool,
    pub format: LocationFormat,
    /// Base location as configured or signaled
    pub location_vars: VariableList,
    pub location_refinement: VariableList,
    pub location_variables: VariableList,
    /// `location_vars` with `location_refinement` merged in
    pub effective_location: VariableList,
    pub usage_rules: VariableList,
    /// Location determination method, PIDF-LO only
    pub method: Option<String>,
}

/// Location state computed by a refresh, applied separately so a shared
/// profile can be updated without holding its lock across a registry call.
#[derive(Clone, Debug)]
pub(crate) struct ResolvedLocation {
    base: Option<(LocationFormat, VariableList)>,
    effective: VariableList,
}

impl EffectiveProfile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Build from a configured profile and resolve its location.
    ///
    /// Fails when the profile names a location the registry doesn't have.
    pub fn from_profile(profile: &ProfileRecord, registry: &dyn GeolocRegistry) -> Result<Self> {
        let mut eprofile = Self {
            id: profile.id.clone(),
            location_reference: profile.location_reference.clone(),
            pidf_element: profile.pidf_element,
            disposition: profile.disposition,
            geolocation_routing: profile.geolocation_routing,
            send_location: profile.send_location,
            location_refinement: profile.location_refinement.clone(),
            location_variables: profile.location_variables.clone(),
            usage_rules: profile.usage_rules.clone(),
            ..Default::default()
        };
        eprofile.refresh_location(registry)?;
        Ok(eprofile)
    }

    /// Look up a profile by name and build from it.
    pub fn from_profile_name(name: &str, registry: &dyn GeolocRegistry) -> Result<Self> {
        let profile = registry
            .get_profile(name)
            .ok_or_else(|| EprofileError::ProfileNotFound(name.to_string()))?;
        Self::from_profile(&profile, registry)
    }

    /// Build from a location URI such as `<https://example.com/loc>`.
    ///
    /// One leading `<`, one trailing `>` and surrounding whitespace are
    /// removed. A URI carries no refinable fields, so the effective location
    /// is left empty.
    pub fn from_uri(uri: &str) -> Result<Self> {
        let trimmed = uri.trim();
        let trimmed = trimmed.strip_prefix('<').unwrap_or(trimmed);
        let trimmed = trimmed.strip_suffix('>').unwrap_or(trimmed).trim();
        if trimmed.is_empty() {
            return Err(EprofileError::EmptyUri);
        }

        let mut eprofile = Self::new(trimmed);
        eprofile.format = LocationFormat::Uri;
        eprofile.location_vars.push("URI", trimmed);
        Ok(eprofile)
    }

    /// Re-read the referenced location and recompute the effective location.
    ///
    /// On error the profile is left as it was.
    pub fn refresh_location(&mut self, registry: &dyn GeolocRegistry) -> Result<()> {
        let resolved = self.resolve_location(registry)?;
        self.apply_location(resolved);
        Ok(())
    }

    pub(crate) fn resolve_location(
        &self,
        registry: &dyn GeolocRegistry,
    ) -> Result<ResolvedLocation> {
        let base = if self.location_reference.is_empty() {
            None
        } else {
            let location = registry.get_location(&self.location_reference).ok_or_else(|| {
                error!(
                    profile = %self.id,
                    location = %self.location_reference,
                    "Profile references a location that doesn't exist"
                );
                EprofileError::LocationNotFound {
                    profile: self.id.clone(),
                    location: self.location_reference.clone(),
                }
            })?;
            Some((location.format, location.location.clone()))
        };

        let source = base.as_ref().map_or(&self.location_vars, |(_, vars)| vars);
        let effective = merge_refinement(source, &self.location_refinement);
        debug!(
            profile = %self.id,
            refinements = self.location_refinement.len(),
            "Effective location computed"
        );
        Ok(ResolvedLocation { base, effective })
    }

    pub(crate) fn apply_location(&mut self, resolved: ResolvedLocation) {
        if let Some((format, vars)) = resolved.base {
            self.format = format;
            self.location_vars = vars;
        }
        self.effective_location = resolved.effective;
    }
}

/// Apply `refinement` on top of a copy of `base`, one entry at a time.
///
/// Each refinement entry overwrites the first variable with its name, or is
/// appended when there is none. Entries are applied in order, so a name
/// repeated in `refinement` ends up with its last value.
pub fn merge_refinement(base: &VariableList, refinement: &VariableList) -> VariableList {
    let mut merged = base.clone();
    for var in refinement {
        merged.replace_or_push(&var.name, var.value.as_str());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoloc_registry::InMemoryGeolocRegistry;
    use geoloc_types::LocationRecord;
    use proptest::prelude::*;

    fn vars(pairs: &[(&str, &str)]) -> VariableList {
        pairs.iter().copied().collect()
    }

    fn registry() -> InMemoryGeolocRegistry {
        let registry = InMemoryGeolocRegistry::new();
        registry
            .put_location(LocationRecord::new(
                "sydney",
                LocationFormat::CivicAddress,
                vars(&[("country", "AU"), ("city", "Sydney")]),
            ))
            .unwrap();
        registry
            .put_profile(
                ProfileRecord::new("office")
                    .with_location_reference("sydney")
                    .with_disposition(Disposition::Prepend)
                    .with_send_location(true)
                    .with_refinement(vars(&[("city", "Melbourne"), ("state_province", "VIC")])),
            )
            .unwrap();
        registry
    }

    #[test]
    fn refinement_replaces_existing_name() {
        let merged = merge_refinement(
            &vars(&[("country", "AU"), ("city", "Sydney")]),
            &vars(&[("city", "Melbourne")]),
        );
        assert_eq!(merged, vars(&[("country", "AU"), ("city", "Melbourne")]));
    }

    #[test]
    fn refinement_appends_new_name() {
        let merged = merge_refinement(
            &vars(&[("country", "AU"), ("city", "Sydney")]),
            &vars(&[("state", "NSW")]),
        );
        assert_eq!(
            merged,
            vars(&[("country", "AU"), ("city", "Sydney"), ("state", "NSW")])
        );
    }

    #[test]
    fn refinement_applies_sequentially() {
        let merged = merge_refinement(
            &vars(&[("country", "AU")]),
            &vars(&[("FLR", "1"), ("country", "NZ"), ("FLR", "2")]),
        );
        assert_eq!(merged, vars(&[("country", "NZ"), ("FLR", "2")]));
    }

    #[test]
    fn from_profile_copies_and_merges() {
        let registry = registry();
        let eprofile = EffectiveProfile::from_profile_name("office", &registry).unwrap();

        assert_eq!(eprofile.id, "office");
        assert_eq!(eprofile.format, LocationFormat::CivicAddress);
        assert_eq!(eprofile.disposition, Disposition::Prepend);
        assert!(eprofile.send_location);
        assert_eq!(
            eprofile.location_vars,
            vars(&[("country", "AU"), ("city", "Sydney")])
        );
        assert_eq!(
            eprofile.effective_location,
            vars(&[
                ("country", "AU"),
                ("city", "Melbourne"),
                ("state_province", "VIC")
            ])
        );
        assert_eq!(
            registry.get_location("sydney").unwrap().location.find("city"),
            Some("Sydney")
        );
    }

    #[test]
    fn missing_profile_and_location() {
        let registry = registry();
        assert!(matches!(
            EffectiveProfile::from_profile_name("nope", &registry),
            Err(EprofileError::ProfileNotFound(_))
        ));

        let profile = ProfileRecord::new("orphan").with_location_reference("gone");
        assert!(matches!(
            EffectiveProfile::from_profile(&profile, &registry),
            Err(EprofileError::LocationNotFound { .. })
        ));
    }

    #[test]
    fn refresh_is_idempotent() {
        let registry = registry();
        let mut eprofile = EffectiveProfile::from_profile_name("office", &registry).unwrap();
        eprofile.refresh_location(&registry).unwrap();
        let first = eprofile.effective_location.to_string();
        eprofile.refresh_location(&registry).unwrap();
        assert_eq!(eprofile.effective_location.to_string(), first);
    }

    #[test]
    fn refresh_follows_registry_changes() {
        let registry = registry();
        let mut eprofile = EffectiveProfile::from_profile_name("office", &registry).unwrap();
        registry
            .put_location(LocationRecord::new(
                "sydney",
                LocationFormat::CivicAddress,
                vars(&[("country", "AU"), ("A1", "NSW")]),
            ))
            .unwrap();
        eprofile.refresh_location(&registry).unwrap();
        assert_eq!(eprofile.location_vars.find("A1"), Some("NSW"));
        assert_eq!(eprofile.effective_location.find("city"), Some("Melbourne"));

        registry.remove_location("sydney");
        let before = eprofile.clone();
        assert!(eprofile.refresh_location(&registry).is_err());
        assert_eq!(eprofile, before);
    }

    #[test]
    fn uri_is_trimmed() {
        let eprofile = EffectiveProfile::from_uri(" <http://x/y> ").unwrap();
        assert_eq!(eprofile.id, "http://x/y");
        assert_eq!(eprofile.format, LocationFormat::Uri);
        assert_eq!(eprofile.location_vars.find("URI"), Some("http://x/y"));
        assert!(eprofile.effective_location.is_empty());

        let bare = EffectiveProfile::from_uri("http://some_uri&a=b").unwrap();
        assert_eq!(bare.id, "http://some_uri&a=b");
    }

    #[test]
    fn empty_uri_is_rejected() {
        assert!(matches!(EffectiveProfile::from_uri("  "), Err(EprofileError::EmptyUri)));
        assert!(matches!(EffectiveProfile::from_uri("<>"), Err(EprofileError::EmptyUri)));
    }

    fn small_list() -> impl Strategy<Value = VariableList> {
        prop::collection::vec(("[a-d]", "[a-z]{0,3}"), 0..6)
            .prop_map(|pairs| pairs.into_iter().collect())
    }

    proptest! {
        #[test]
        fn merge_keeps_last_refinement_value(base in small_list(), refinement in small_list()) {
            let merged = merge_refinement(&base, &refinement);

            for var in &refinement {
                let last = refinement
                    .iter()
                    .filter(|v| v.name == var.name)
                    .last()
                    .map(|v| v.value.as_str());
                prop_assert_eq!(merged.find(&var.name), last);
            }

            let mut added: Vec<&str> = refinement
                .names()
                .filter(|name| !base.contains(name))
                .collect();
            added.sort_unstable();
            added.dedup();
            prop_assert_eq!(merged.len(), base.len() + added.len());

            for (original, kept) in base.iter().zip(merged.iter()) {
                prop_assert_eq!(&original.name, &kept.name);
            }
        }
    }
}

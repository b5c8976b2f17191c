//! Combining configured and signaled locations for an incoming call.
//!
//! The configured profile's disposition decides what the call ends up with:
//!
//! | disposition | resulting list                                  |
//! |-------------|-------------------------------------------------|
//! | `discard`   | configured profile only                         |
//! | `append`    | signaled locations, then the configured profile |
//! | `prepend`   | configured profile, then signaled locations     |
//! | `replace`   | signaled locations only                         |
//!
//! A signaled URI that can't be turned into an effective profile is logged
//! and skipped; the remaining URIs are still processed.

use geoloc_registry::GeolocRegistry;
use geoloc_types::{Disposition, ProfileRecord};
use tracing::{debug, info, trace, warn};

use crate::call::CallLocations;
use crate::effective::EffectiveProfile;
use crate::error::{EprofileError, Result};
use crate::signaling::{is_cid_uri, location_uri, split_geolocation_header, BodyPartSource};

/// Location data received with a message.
#[derive(Clone, Copy)]
pub struct SignaledLocation<'a> {
    /// Raw `Geolocation` header value, if the message had one
    pub geolocation: Option<&'a str>,
    pub body: &'a dyn BodyPartSource,
}

impl<'a> SignaledLocation<'a> {
    pub fn new(geolocation: Option<&'a str>, body: &'a dyn BodyPartSource) -> Self {
        Self { geolocation, body }
    }

    /// The header value, when present and not blank.
    fn header(&self) -> Option<&'a str> {
        self.geolocation.map(str::trim).filter(|h| !h.is_empty())
    }
}

/// Builds a call's location list from its configured profile and the
/// signaled location data.
pub struct DispositionCombinator<'r> {
    registry: &'r dyn GeolocRegistry,
}

impl<'r> DispositionCombinator<'r> {
    pub fn new(registry: &'r dyn GeolocRegistry) -> Self {
        Self { registry }
    }

    /// Produce the call's location list.
    ///
    /// `session` names the call in diagnostics. An empty result means no
    /// usable location was found.
    pub fn combine(
        &self,
        session: &str,
        configured: Option<&ProfileRecord>,
        signaled: SignaledLocation<'_>,
    ) -> CallLocations {
        let mut locations = CallLocations::new();
        let header = signaled.header();

        let Some(profile) = configured else {
            match header {
                Some(header) => info!(
                    session,
                    geolocation = header,
                    "No geolocation profile configured; Geolocation info discarded"
                ),
                None => info!(session, "No geolocation profile configured"),
            }
            return locations;
        };

        match (profile.disposition, header) {
            (Disposition::Discard, header) => {
                if let Some(header) = header {
                    debug!(session, profile = %profile.id, geolocation = header, "Discarding Geolocation");
                }
                self.push_configured(session, profile, &mut locations);
            }
            (Disposition::Prepend, header) => {
                self.push_configured(session, profile, &mut locations);
                if let Some(header) = header {
                    self.push_signaled(session, profile, header, signaled.body, &mut locations);
                }
            }
            (Disposition::Append, header) => {
                if let Some(header) = header {
                    self.push_signaled(session, profile, header, signaled.body, &mut locations);
                }
                self.push_configured(session, profile, &mut locations);
            }
            (Disposition::Replace, Some(header)) => {
                self.push_signaled(session, profile, header, signaled.body, &mut locations);
            }
            (Disposition::Replace, None) => {
                warn!(
                    session,
                    profile = %profile.id,
                    "Disposition is 'replace' but there's no Geolocation header to replace it with"
                );
            }
        }

        if locations.is_empty() {
            info!(session, profile = %profile.id, "No usable location found");
        } else {
            debug!(session, count = locations.len(), "Call locations resolved");
        }
        locations
    }

    fn push_configured(&self, session: &str, profile: &ProfileRecord, locations: &mut CallLocations) {
        match EffectiveProfile::from_profile(profile, self.registry) {
            Ok(eprofile) => {
                locations.push(eprofile);
            }
            Err(e) => warn!(
                session,
                profile = %profile.id,
                error = %e,
                "Unable to create effective profile from profile"
            ),
        }
    }

    fn push_signaled(
        &self,
        session: &str,
        profile: &ProfileRecord,
        header: &str,
        body: &dyn BodyPartSource,
        locations: &mut CallLocations,
    ) {
        for value in split_geolocation_header(header) {
            trace!(session, uri = value, "Processing Geolocation URI");
            match signaled_profile(session, value, body) {
                Ok(mut eprofile) => {
                    eprofile.disposition = profile.disposition;
                    eprofile.send_location = profile.send_location;
                    locations.push(eprofile);
                }
                Err(e) => warn!(session, uri = value, error = %e, "Skipping Geolocation URI"),
            }
        }
    }
}

/// Effective profile for one `<scheme:opaque>` header value.
///
/// `cid:` URIs name a PIDF-LO document in the message body; any other URI is
/// passed along by reference.
pub fn signaled_profile(
    session: &str,
    value: &str,
    body: &dyn BodyPartSource,
) -> Result<EffectiveProfile> {
    let uri = location_uri(value)?;
    if !is_cid_uri(uri) {
        trace!(session, uri, "Location by reference");
        return EffectiveProfile::from_uri(uri);
    }

    trace!(session, uri, "Location by value");
    let document = body
        .find_body_part(uri)
        .ok_or_else(|| EprofileError::BodyPartNotFound(uri.to_string()))?;
    EffectiveProfile::from_pidf(document, session)
}

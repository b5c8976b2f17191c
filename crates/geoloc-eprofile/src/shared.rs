//! Shared effective profile handle.

use std::sync::Arc;

use geoloc_registry::GeolocRegistry;
use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};
use tracing::trace;

use crate::effective::EffectiveProfile;
use crate::error::Result;

#[derive(Debug)]
struct Versioned {
    profile: EffectiveProfile,
    /// Bumped by every committed refresh
    generation: u64,
}

/// A reference-counted effective profile.
///
/// Clones share one profile. A refresh builds the new location state without
/// holding the lock and swaps it in under the write lock, so a reader sees
/// the profile either wholly before or wholly after the refresh. A refresh
/// whose registry read was overtaken by another committed refresh resolves
/// again, so the last commit always reflects the newest read.
#[derive(Clone, Debug)]
pub struct SharedEffectiveProfile(Arc<RwLock<Versioned>>);

impl SharedEffectiveProfile {
    pub fn new(profile: EffectiveProfile) -> Self {
        Self(Arc::new(RwLock::new(Versioned {
            profile,
            generation: 0,
        })))
    }

    pub fn id(&self) -> String {
        self.0.read().profile.id.clone()
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> EffectiveProfile {
        self.0.read().profile.clone()
    }

    /// Borrow the current state. Don't hold the guard across a refresh.
    pub fn read(&self) -> MappedRwLockReadGuard<'_, EffectiveProfile> {
        RwLockReadGuard::map(self.0.read(), |v| &v.profile)
    }

    /// See [`EffectiveProfile::refresh_location`].
    pub fn refresh_location(&self, registry: &dyn GeolocRegistry) -> Result<()> {
        loop {
            let (profile, generation) = {
                let current = self.0.read();
                (current.profile.clone(), current.generation)
            };
            let resolved = profile.resolve_location(registry)?;

            let mut current = self.0.write();
            if current.generation == generation {
                current.profile.apply_location(resolved);
                current.generation += 1;
                return Ok(());
            }
            trace!(profile = %profile.id, "Refresh overtaken by a newer one; resolving again");
        }
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<EffectiveProfile> for SharedEffectiveProfile {
    fn from(profile: EffectiveProfile) -> Self {
        Self::new(profile)
    }
}

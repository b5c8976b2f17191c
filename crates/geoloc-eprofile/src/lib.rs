//! # geoloc-eprofile
//!
//! Effective profile resolution for a call:
//!
//! - **EffectiveProfile**: built from a configured profile, a location URI
//!   or a PIDF-LO document, with refinements merged into the location
//! - **SharedEffectiveProfile**: reference-counted handle that refreshes
//!   atomically
//! - **DispositionCombinator**: orders configured and signaled locations
//!   into the call's [`CallLocations`]
//!
//! Everything here is synchronous and CPU-bound; registry lookups go through
//! [`geoloc_registry::GeolocRegistry`].

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod call;
pub mod disposition;
pub mod effective;
pub mod error;
pub mod pidf;
pub mod shared;
pub mod signaling;

pub use call::CallLocations;
pub use disposition::{signaled_profile, DispositionCombinator, SignaledLocation};
pub use effective::{merge_refinement, EffectiveProfile};
pub use error::{EprofileError, Result};
pub use pidf::{PidfDocument, PidfExtract};
pub use shared::SharedEffectiveProfile;
pub use signaling::{split_geolocation_header, BodyPart, BodyPartSource, MessageBody};

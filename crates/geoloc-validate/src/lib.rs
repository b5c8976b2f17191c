//! # geoloc-validate
//!
//! Validators for configured location data:
//!
//! - **civic** : the civicAddress code/synonym table and the civic validator
//! - **gml** : the GML shape grammar and the shape validator
//!
//! Both tables are static and read-only after first use, so they are safe
//! to consult from any number of threads.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod civic;
pub mod error;
pub mod gml;

pub use civic::{code_for_name, name_for_code, resolve, validate_civic, SynonymEntry, SynonymTable};
pub use error::{Result, ValidationError};
pub use gml::{find_shape, validate_gml, ShapeAttribute, ShapeDefinition, SHAPES};

//! GML shape grammar (RFC 5491 shapes) and the shape validator.
//!
//! The `type` variable selects a shape definition; every other variable must
//! be an attribute of that shape, carry a valid value, and occur within the
//! attribute's bounds.

use geoloc_types::VariableList;
use std::fmt;

use crate::error::{Result, ValidationError};

/// Checks a single attribute value.
pub type ValueValidator = fn(&str) -> bool;

/// One attribute of a shape with its occurrence bounds.
#[derive(Clone, Copy)]
pub struct ShapeAttribute {
    pub name: &'static str,
    pub min: usize,
    /// `None` is unbounded.
    pub max: Option<usize>,
    pub validator: ValueValidator,
}

impl fmt::Debug for ShapeAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShapeAttribute")
            .field("name", &self.name)
            .field("min", &self.min)
            .field("max", &self.max)
            .finish_non_exhaustive()
    }
}

/// A shape type and its attributes.
#[derive(Clone, Copy, Debug)]
pub struct ShapeDefinition {
    pub shape_type: &'static str,
    pub attributes: &'static [ShapeAttribute],
}

impl ShapeDefinition {
    pub fn attribute(&self, name: &str) -> Option<&ShapeAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

const fn one(name: &'static str, validator: ValueValidator) -> ShapeAttribute {
    ShapeAttribute {
        name,
        min: 1,
        max: Some(1),
        validator,
    }
}

const fn at_least(name: &'static str, min: usize, validator: ValueValidator) -> ShapeAttribute {
    ShapeAttribute {
        name,
        min,
        max: None,
        validator,
    }
}

/// Built-in shapes. `Ellipse` appears twice (2-D and 3-D); lookups take the
/// last definition with a matching name.
pub const SHAPES: &[ShapeDefinition] = &[
    ShapeDefinition {
        shape_type: "Point",
        attributes: &[one("pos", pos)],
    },
    ShapeDefinition {
        shape_type: "Polygon",
        attributes: &[at_least("pos", 3, pos)],
    },
    ShapeDefinition {
        shape_type: "Circle",
        attributes: &[one("pos", pos), one("radius", float)],
    },
    ShapeDefinition {
        shape_type: "Ellipse",
        attributes: &[
            one("pos", pos),
            one("semiMajorAxis", float),
            one("semiMinorAxis", float),
            one("orientation", float),
            one("orientation_uom", uom),
        ],
    },
    ShapeDefinition {
        shape_type: "ArcBand",
        attributes: &[
            one("pos", pos),
            one("innerRadius", float),
            one("outerRadius", float),
            one("startAngle", float),
            one("startAngle_uom", uom),
            one("openingAngle", float),
            one("openingAngle_uom", uom),
        ],
    },
    ShapeDefinition {
        shape_type: "Sphere",
        attributes: &[one("pos3d", pos3d), one("radius", float)],
    },
    ShapeDefinition {
        shape_type: "Ellipse",
        attributes: &[
            one("pos3d", pos3d),
            one("semiMajorAxis", float),
            one("semiMinorAxis", float),
            one("verticalAxis", float),
            one("orientation", float),
            one("orientation_uom", uom),
        ],
    },
    ShapeDefinition {
        shape_type: "Prism",
        attributes: &[at_least("pos3d", 3, pos3d), one("height", float)],
    },
];

fn floats(value: &str, count: usize) -> bool {
    let mut tokens = value.split_whitespace();
    let parsed = tokens
        .by_ref()
        .take(count)
        .filter(|t| t.parse::<f64>().is_ok())
        .count();
    parsed == count && tokens.next().is_none()
}

/// Two whitespace separated numbers.
pub fn pos(value: &str) -> bool {
    floats(value, 2)
}

/// Three whitespace separated numbers.
pub fn pos3d(value: &str) -> bool {
    floats(value, 3)
}

/// A single number.
pub fn float(value: &str) -> bool {
    floats(value, 1)
}

/// Unit of measure for angles.
pub fn uom(value: &str) -> bool {
    value == "degrees" || value == "radians"
}

/// Find a shape by exact name; the last matching definition wins.
pub fn find_shape(shape_type: &str) -> Option<&'static ShapeDefinition> {
    SHAPES.iter().rev().find(|s| s.shape_type == shape_type)
}

/// Validate a GML variable list against the built-in shapes.
pub fn validate_gml(list: &VariableList) -> Result<()> {
    let shape_type = list.find("type").ok_or(ValidationError::MissingType)?;
    let shape =
        find_shape(shape_type).ok_or_else(|| ValidationError::InvalidType(shape_type.to_string()))?;

    for var in list.iter().filter(|v| v.name != "type") {
        let attr = shape
            .attribute(&var.name)
            .ok_or_else(|| ValidationError::InvalidVarname(var.name.clone()))?;
        if !(attr.validator)(&var.value) {
            return Err(ValidationError::InvalidValue(var.name.clone()));
        }
    }

    for attr in shape.attributes {
        let count = list.count(attr.name);
        if count < attr.min {
            return Err(ValidationError::NotEnoughVarnames(attr.name.to_string()));
        }
        if attr.max.is_some_and(|max| count > max) {
            return Err(ValidationError::TooManyVarnames(attr.name.to_string()));
        }
    }
    Ok(())
}

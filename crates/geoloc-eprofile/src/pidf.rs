//! PIDF-LO (RFC 4119 / RFC 5491) to effective profile transform.
//!
//! A [`PidfDocument`] is searched for the first `device`, `tuple` or `person`
//! element that carries a `location-info`. The hit is flattened into a
//! [`PidfExtract`]: the element id, the kind of element, the location format,
//! and the location and usage rules as variable list text. The effective
//! profile is then built from the extract.

use geoloc_types::{LocationFormat, PidfElement, VariableList};
use roxmltree::{Document, Node};
use tracing::{debug, error, warn};

use crate::effective::EffectiveProfile;
use crate::error::{EprofileError, Result};

pub const PIDF_NS: &str = "urn:ietf:params:xml:ns:pidf";
pub const DATA_MODEL_NS: &str = "urn:ietf:params:xml:ns:pidf:data-model";
pub const GEOPRIV_NS: &str = "urn:ietf:params:xml:ns:pidf:geopriv10";
pub const CIVIC_ADDRESS_NS: &str = "urn:ietf:params:xml:ns:pidf:geopriv10:civicAddr";
pub const GML_NS: &str = "http://www.opengis.net/gml";
pub const GEOSHAPE_NS: &str = "http://www.opengis.net/pidflo/1.0";

/// Intermediate form of one location-bearing PIDF element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PidfExtract {
    /// Element `id`, or the presence `entity` when the element has none
    pub id: String,
    pub pidf_element: PidfElement,
    /// `gml`, `civicAddress`, or the unrecognized location element's name
    pub format: String,
    pub location_info: String,
    pub usage_rules: String,
    pub method: Option<String>,
}

/// A parsed PIDF-LO document.
pub struct PidfDocument<'input> {
    doc: Document<'input>,
}

impl<'input> PidfDocument<'input> {
    pub fn parse(text: &'input str) -> Result<Self> {
        let doc = Document::parse(text)?;
        if !doc.root_element().has_tag_name((PIDF_NS, "presence")) {
            return Err(EprofileError::NotPidf);
        }
        Ok(Self { doc })
    }

    /// The presence `entity` attribute.
    pub fn entity(&self) -> Option<&str> {
        self.doc.root_element().attribute("entity")
    }

    /// The first element of `kind` carrying a location.
    pub fn search(&self, kind: PidfElement) -> Option<PidfExtract> {
        let tag = element_tag(kind)?;
        self.doc
            .root_element()
            .children()
            .filter(|node| node.has_tag_name(tag))
            .find_map(|node| self.extract(node, kind))
    }

    /// Every element of `kind` carrying a location, in document order.
    pub fn extracts(&self, kind: PidfElement) -> Vec<PidfExtract> {
        let Some(tag) = element_tag(kind) else {
            return Vec::new();
        };
        self.doc
            .root_element()
            .children()
            .filter(|node| node.has_tag_name(tag))
            .filter_map(|node| self.extract(node, kind))
            .collect()
    }

    fn extract(&self, node: Node<'_, '_>, kind: PidfElement) -> Option<PidfExtract> {
        let location_info = node
            .descendants()
            .find(|n| n.has_tag_name((GEOPRIV_NS, "location-info")))?;
        let geopriv = location_info.parent_element();

        let id = node
            .attribute("id")
            .filter(|id| !id.is_empty())
            .or_else(|| self.entity())
            .unwrap_or_default()
            .to_string();

        let (format, location) = location_vars(location_info);
        let usage_rules = geopriv
            .and_then(|g| child(g, GEOPRIV_NS, "usage-rules"))
            .map(leaf_vars)
            .unwrap_or_default();
        let method = geopriv
            .and_then(|g| child(g, GEOPRIV_NS, "method"))
            .map(text_of)
            .filter(|m| !m.is_empty());

        Some(PidfExtract {
            id,
            pidf_element: kind,
            format,
            location_info: location.join(",", "=", Some('"')),
            usage_rules: usage_rules.join(",", "=", Some('"')),
            method,
        })
    }
}

impl EffectiveProfile {
    /// Build from a signaled PIDF-LO document.
    ///
    /// Devices are searched first, then tuples, then persons; the first
    /// element found with a location is used. `reference` names the source
    /// in diagnostics.
    pub fn from_pidf(document: &str, reference: &str) -> Result<Self> {
        let doc = PidfDocument::parse(document)?;
        Self::from_pidf_document(&doc, reference)
    }

    pub fn from_pidf_document(doc: &PidfDocument<'_>, reference: &str) -> Result<Self> {
        for kind in PidfElement::PRIORITY {
            if let Some(extract) = doc.search(kind) {
                debug!(reference, element = %kind, id = %extract.id, "PIDF location found");
                return Self::from_pidf_extract(&extract, reference);
            }
        }
        Err(EprofileError::NoLocation {
            reference: reference.to_string(),
        })
    }

    pub fn from_pidf_extract(extract: &PidfExtract, reference: &str) -> Result<Self> {
        let format = match extract.format.as_str() {
            "gml" => LocationFormat::Gml,
            "civicAddress" => LocationFormat::CivicAddress,
            other => {
                error!(reference, format = other, "Unknown PIDF location format");
                return Err(EprofileError::UnknownFormat {
                    reference: reference.to_string(),
                    format: other.to_string(),
                });
            }
        };

        let location_vars = VariableList::parse(&extract.location_info).map_err(|e| {
            error!(reference, text = %extract.location_info, error = %e, "Unable to create location variables");
            EprofileError::InvalidLocationInfo {
                reference: reference.to_string(),
                text: extract.location_info.clone(),
                source: e,
            }
        })?;
        if location_vars.is_empty() {
            error!(reference, "PIDF location-info has no location variables");
            return Err(EprofileError::EmptyLocationInfo {
                reference: reference.to_string(),
            });
        }

        let usage_rules = VariableList::parse(&extract.usage_rules).unwrap_or_else(|e| {
            warn!(reference, error = %e, "Ignoring unparsable usage rules");
            VariableList::new()
        });

        let mut eprofile = EffectiveProfile::new(extract.id.as_str());
        eprofile.format = format;
        eprofile.pidf_element = extract.pidf_element;
        eprofile.location_vars = location_vars;
        eprofile.usage_rules = usage_rules;
        eprofile.method = extract.method.clone();
        Ok(eprofile)
    }
}

fn element_tag(kind: PidfElement) -> Option<(&'static str, &'static str)> {
    match kind {
        PidfElement::None => None,
        PidfElement::Tuple => Some((PIDF_NS, "tuple")),
        PidfElement::Device => Some((DATA_MODEL_NS, "device")),
        PidfElement::Person => Some((DATA_MODEL_NS, "person")),
    }
}

fn child<'a, 'input>(node: Node<'a, 'input>, ns: &str, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name((ns, name)))
}

/// Element text with runs of whitespace collapsed to single spaces.
fn text_of(node: Node<'_, '_>) -> String {
    node.text()
        .unwrap_or_default()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_leaf(node: &Node<'_, '_>) -> bool {
    node.is_element() && !node.children().any(|c| c.is_element())
}

/// `name=text` for each child element.
fn leaf_vars(node: Node<'_, '_>) -> VariableList {
    node.children()
        .filter(Node::is_element)
        .map(|n| (n.tag_name().name(), text_of(n)))
        .collect()
}

fn location_vars(location_info: Node<'_, '_>) -> (String, VariableList) {
    let Some(shape) = location_info.children().find(Node::is_element) else {
        return (String::new(), VariableList::new());
    };

    match shape.tag_name().namespace() {
        Some(CIVIC_ADDRESS_NS) if shape.tag_name().name() == "civicAddress" => {
            let mut vars = VariableList::new();
            vars.push("format", "civicAddress");
            for var in leaf_vars(shape) {
                vars.push(var.name, var.value);
            }
            ("civicAddress".to_string(), vars)
        }
        Some(GML_NS) | Some(GEOSHAPE_NS) => ("gml".to_string(), gml_vars(shape)),
        _ => (shape.tag_name().name().to_string(), VariableList::new()),
    }
}

/// Flatten a GML shape: `format`, `type` and `crs`, then every leaf element
/// in document order.
fn gml_vars(shape: Node<'_, '_>) -> VariableList {
    let three_d = shape
        .attribute("srsName")
        .is_some_and(|srs| srs.ends_with("4979"));
    let pos_name = if three_d { "pos3d" } else { "pos" };

    let mut vars = VariableList::new();
    vars.push("format", "gml");
    vars.push("type", shape.tag_name().name());
    vars.push("crs", if three_d { "3d" } else { "2d" });

    for leaf in shape.descendants().skip(1).filter(is_leaf) {
        let name = leaf.tag_name().name();
        let value = text_of(leaf);
        match name {
            "pos" => vars.push(pos_name, value),
            "posList" => {
                let tokens: Vec<&str> = value.split_whitespace().collect();
                let points = tokens.chunks_exact(if three_d { 3 } else { 2 });
                if !points.remainder().is_empty() {
                    warn!(
                        shape = shape.tag_name().name(),
                        tokens = tokens.len(),
                        dropped = %points.remainder().join(" "),
                        "posList doesn't divide into whole positions; dropping the trailing values"
                    );
                }
                for point in points {
                    vars.push(pos_name, point.join(" "));
                }
            }
            _ => {
                vars.push(name, value);
                if let Some(unit) = leaf.attribute("uom").and_then(angle_unit) {
                    vars.push(format!("{name}_uom"), unit);
                }
            }
        }
    }
    vars
}

/// EPSG 9101 and 9102 are the angular units; linear units carry no entry.
fn angle_unit(uom: &str) -> Option<&'static str> {
    if uom.ends_with("9101") {
        Some("radians")
    } else if uom.ends_with("9102") {
        Some("degrees")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoloc_types::VariableListError;

    fn presence(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<presence xmlns="urn:ietf:params:xml:ns:pidf"
    xmlns:dm="urn:ietf:params:xml:ns:pidf:data-model"
    xmlns:gp="urn:ietf:params:xml:ns:pidf:geopriv10"
    xmlns:ca="urn:ietf:params:xml:ns:pidf:geopriv10:civicAddr"
    xmlns:gml="http://www.opengis.net/gml"
    xmlns:gs="http://www.opengis.net/pidflo/1.0"
    entity="pres:bob@example.com">{body}</presence>"#
        )
    }

    const TUPLE_POINT: &str = r#"
  <tuple id="point-tuple">
    <status><gp:geopriv>
      <gp:location-info>
        <gml:Point srsName="urn:ogc:def:crs:EPSG::4326">
          <gml:pos>-34.410649 150.87651</gml:pos>
        </gml:Point>
      </gp:location-info>
      <gp:method>Manual</gp:method>
    </gp:geopriv></status>
  </tuple>"#;

    const DEVICE_CIRCLE: &str = r#"
  <dm:device id="circle-device">
    <gp:geopriv>
      <gp:location-info>
        <gs:Circle srsName="urn:ogc:def:crs:EPSG::4326">
          <gml:pos>1.5 2.5</gml:pos>
          <gs:radius uom="urn:ogc:def:uom:EPSG::9001">850.24</gs:radius>
        </gs:Circle>
      </gp:location-info>
    </gp:geopriv>
  </dm:device>"#;

    #[test]
    fn device_wins_over_tuple() {
        let text = presence(&format!("{TUPLE_POINT}{DEVICE_CIRCLE}"));
        let eprofile = EffectiveProfile::from_pidf(&text, "test").unwrap();
        assert_eq!(eprofile.id, "circle-device");
        assert_eq!(eprofile.pidf_element, PidfElement::Device);
        assert_eq!(eprofile.format, LocationFormat::Gml);
        assert_eq!(
            eprofile.location_vars.join(",", "=", None),
            "format=gml,type=Circle,crs=2d,pos=1.5 2.5,radius=850.24"
        );
        assert_eq!(eprofile.method, None);
    }

    #[test]
    fn tuple_used_without_device() {
        let eprofile = EffectiveProfile::from_pidf(&presence(TUPLE_POINT), "test").unwrap();
        assert_eq!(eprofile.id, "point-tuple");
        assert_eq!(eprofile.pidf_element, PidfElement::Tuple);
        assert_eq!(eprofile.method.as_deref(), Some("Manual"));
        assert_eq!(eprofile.location_vars.find("pos"), Some("-34.410649 150.87651"));
    }

    #[test]
    fn elements_without_location_are_skipped() {
        let text = presence(&format!(
            r#"<dm:device id="empty"><dm:deviceID>mac:1</dm:deviceID></dm:device>{TUPLE_POINT}"#
        ));
        let doc = PidfDocument::parse(&text).unwrap();
        assert!(doc.search(PidfElement::Device).is_none());
        let eprofile = EffectiveProfile::from_pidf_document(&doc, "test").unwrap();
        assert_eq!(eprofile.id, "point-tuple");
    }

    #[test]
    fn three_d_positions_and_pos_list() {
        let text = presence(
            r#"
  <dm:person>
    <gp:geopriv>
      <gp:location-info>
        <gs:Prism srsName="urn:ogc:def:crs:EPSG::4979">
          <gs:base><gml:Polygon><gml:exterior><gml:LinearRing>
            <gml:posList>1 2 3
              4 5 6 7 8 9</gml:posList>
          </gml:LinearRing></gml:exterior></gml:Polygon></gs:base>
          <gs:height uom="urn:ogc:def:uom:EPSG::9001">2.4</gs:height>
        </gs:Prism>
      </gp:location-info>
    </gp:geopriv>
  </dm:person>"#,
        );
        let eprofile = EffectiveProfile::from_pidf(&text, "test").unwrap();
        assert_eq!(eprofile.id, "pres:bob@example.com");
        assert_eq!(eprofile.pidf_element, PidfElement::Person);
        assert_eq!(
            eprofile.location_vars.join(",", "=", None),
            "format=gml,type=Prism,crs=3d,pos3d=1 2 3,pos3d=4 5 6,pos3d=7 8 9,height=2.4"
        );
    }

    #[test]
    fn unknown_format_is_an_error() {
        let text = presence(
            r#"<tuple id="t"><status><gp:geopriv><gp:location-info>
                 <kml xmlns="http://www.opengis.net/kml/2.2"/>
               </gp:location-info></gp:geopriv></status></tuple>"#,
        );
        match EffectiveProfile::from_pidf(&text, "test") {
            Err(EprofileError::UnknownFormat { format, .. }) => assert_eq!(format, "kml"),
            other => panic!("expected unknown format, got {other:?}"),
        }
    }

    #[test]
    fn empty_location_info_is_an_error() {
        let text = presence(
            r#"<tuple id="t"><status><gp:geopriv><gp:location-info/></gp:geopriv></status></tuple>"#,
        );
        assert!(matches!(
            EffectiveProfile::from_pidf(&text, "test"),
            Err(EprofileError::UnknownFormat { .. })
        ));
    }

    #[test]
    fn no_location_anywhere() {
        let text = presence(r#"<tuple id="t"><status><basic>open</basic></status></tuple>"#);
        assert!(matches!(
            EffectiveProfile::from_pidf(&text, "test"),
            Err(EprofileError::NoLocation { .. })
        ));
    }

    #[test]
    fn not_a_pidf_document() {
        assert!(matches!(
            EffectiveProfile::from_pidf("<notpresence/>", "test"),
            Err(EprofileError::NotPidf)
        ));
        assert!(matches!(
            EffectiveProfile::from_pidf("<presence", "test"),
            Err(EprofileError::Xml(_))
        ));
    }

    #[test]
    fn civic_value_with_quote_and_comma() {
        let text = presence(
            r#"<tuple id="shop"><status><gp:geopriv><gp:location-info>
                 <ca:civicAddress>
                   <ca:country>AU</ca:country>
                   <ca:NAM>Bob's "Best, Ltd</ca:NAM>
                 </ca:civicAddress>
               </gp:location-info></gp:geopriv></status></tuple>"#,
        );
        let eprofile = EffectiveProfile::from_pidf(&text, "test").unwrap();
        assert_eq!(eprofile.format, LocationFormat::CivicAddress);
        assert_eq!(eprofile.location_vars.find("country"), Some("AU"));
        assert_eq!(eprofile.location_vars.find("NAM"), Some(r#"Bob's "Best, Ltd"#));
    }

    #[test]
    fn partial_pos_list_point_is_dropped() {
        let text = presence(
            r#"<tuple id="area"><status><gp:geopriv><gp:location-info>
                 <gml:Polygon srsName="urn:ogc:def:crs:EPSG::4326"><gml:exterior><gml:LinearRing>
                   <gml:posList>1 2 3 4 5 6 7</gml:posList>
                 </gml:LinearRing></gml:exterior></gml:Polygon>
               </gp:location-info></gp:geopriv></status></tuple>"#,
        );
        let eprofile = EffectiveProfile::from_pidf(&text, "test").unwrap();
        let positions: Vec<&str> = eprofile
            .location_vars
            .iter()
            .filter(|v| v.name == "pos")
            .map(|v| v.value.as_str())
            .collect();
        assert_eq!(positions, vec!["1 2", "3 4", "5 6"]);
    }

    fn extract_with(location_info: &str) -> PidfExtract {
        PidfExtract {
            id: "x".into(),
            pidf_element: PidfElement::Tuple,
            format: "gml".into(),
            location_info: location_info.into(),
            usage_rules: String::new(),
            method: None,
        }
    }

    #[test]
    fn extract_with_unparsable_location_text() {
        match EffectiveProfile::from_pidf_extract(&extract_with("no separator here"), "test") {
            Err(EprofileError::InvalidLocationInfo { source, .. }) => assert_eq!(
                source,
                VariableListError::MissingSeparator {
                    item: "no separator here".into(),
                    separator: "=".into()
                }
            ),
            other => panic!("expected invalid location info, got {other:?}"),
        }
        assert!(matches!(
            EffectiveProfile::from_pidf_extract(&extract_with("  "), "test"),
            Err(EprofileError::EmptyLocationInfo { .. })
        ));
    }
}

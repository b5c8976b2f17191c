//! Helpers for the signaling side of a call: splitting a `Geolocation`
//! header value (RFC 6442) into location URIs and finding the message body
//! part a `cid:` URI refers to.

use crate::error::{EprofileError, Result};

pub const PIDF_CONTENT_TYPE: &str = "application/pidf+xml";
pub const MULTIPART_MIXED: &str = "multipart/mixed";

/// Split a `Geolocation` header value into its location values.
///
/// Commas inside `<...>` don't split. Values are trimmed and empty values
/// dropped.
pub fn split_geolocation_header(value: &str) -> Vec<&str> {
    let mut values = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in value.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                values.push(value[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    values.push(value[start..].trim());
    values.retain(|v| !v.is_empty());
    values
}

/// The URI inside a `<scheme:opaque>` location value.
///
/// Header parameters after the closing `>` (`;inserted-by=...`) are ignored.
pub fn location_uri(value: &str) -> Result<&str> {
    let malformed = || EprofileError::MalformedUri(value.to_string());

    let inner = value.trim().strip_prefix('<').ok_or_else(malformed)?;
    let (uri, params) = inner.split_once('>').ok_or_else(malformed)?;
    let params = params.trim_start();
    if !(params.is_empty() || params.starts_with(';')) {
        return Err(malformed());
    }

    let uri = uri.trim();
    match uri.split_once(':') {
        Some((scheme, rest)) if is_scheme(scheme) && !rest.is_empty() => Ok(uri),
        _ => Err(malformed()),
    }
}

fn is_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// True for `cid:` URIs, which point into the message body.
pub fn is_cid_uri(uri: &str) -> bool {
    uri.get(..4).is_some_and(|s| s.eq_ignore_ascii_case("cid:"))
}

/// Access to a received message's body.
pub trait BodyPartSource {
    /// The PIDF document a `cid:` URI refers to, if the body has it.
    fn find_body_part(&self, cid_uri: &str) -> Option<&str>;
}

/// One part of a `multipart/mixed` body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BodyPart {
    /// `Content-ID` header value, usually `<local@domain>`
    pub content_id: String,
    pub content_type: String,
    pub body: String,
}

impl BodyPart {
    pub fn new(
        content_id: impl Into<String>,
        content_type: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            content_id: content_id.into(),
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    fn matches_cid(&self, cid: &str) -> bool {
        let id = self.content_id.trim();
        let id = id.strip_prefix('<').unwrap_or(id);
        let id = id.strip_suffix('>').unwrap_or(id);
        id == cid
    }
}

/// A message body as received.
///
/// An `application/pidf+xml` body is the document for any `cid:` URI; a
/// `multipart/mixed` body is searched by `Content-ID`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageBody {
    pub content_type: String,
    pub body: String,
    pub parts: Vec<BodyPart>,
}

impl MessageBody {
    /// A single-document body.
    pub fn single(content_type: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            body: body.into(),
            parts: Vec::new(),
        }
    }

    pub fn multipart(parts: Vec<BodyPart>) -> Self {
        Self {
            content_type: MULTIPART_MIXED.to_string(),
            body: String::new(),
            parts,
        }
    }

    /// Media type without parameters.
    fn media_type(&self) -> &str {
        self.content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
    }
}

impl BodyPartSource for MessageBody {
    fn find_body_part(&self, cid_uri: &str) -> Option<&str> {
        let media_type = self.media_type();
        let body = if media_type.eq_ignore_ascii_case(PIDF_CONTENT_TYPE) {
            self.body.as_str()
        } else if media_type.eq_ignore_ascii_case(MULTIPART_MIXED) {
            let cid = cid_uri.get(4..).filter(|_| is_cid_uri(cid_uri))?;
            self.parts.iter().find(|p| p.matches_cid(cid))?.body.as_str()
        } else {
            return None;
        };
        Some(body).filter(|b| !b.trim().is_empty())
    }
}

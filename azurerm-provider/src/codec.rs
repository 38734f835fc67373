//! Property codec for kind-discriminated property documents
//!
//! ARM resources carry loosely typed nested `properties`, and which fields
//! are present depends on a discriminator (`kind`, `instanceType`, ...).
//! Decoding goes through two steps:
//!
//! 1. [`normalize`] turns whatever the API returned into a
//!    [`CanonicalDocument`]: a discriminator plus a JSON object with `null`
//!    members removed. Properties sent back as a JSON string are parsed.
//! 2. The [`TaggedProperties`] implementation decodes the canonical form
//!    strictly into a typed value; missing or mistyped fields are errors.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Where the discriminator sits in a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagLayout {
    /// `{"<tag>": "Kind", "<content>": { ...fields }}`
    Adjacent {
        tag: &'static str,
        content: &'static str,
    },
    /// `{"<tag>": "Kind", ...fields}`
    Internal { tag: &'static str },
}

/// Discriminator plus the remaining fields, nulls stripped
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalDocument {
    pub kind: String,
    pub properties: Map<String, Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("missing discriminator {0:?}")]
    MissingTag(&'static str),

    #[error("unexpected kind {actual:?}, expected {expected:?}")]
    UnexpectedKind { expected: String, actual: String },

    #[error("unsupported kind {0:?}")]
    UnsupportedKind(String),

    #[error("invalid {kind} properties: {source}")]
    Invalid {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A typed union of property records keyed by a discriminator
pub trait TaggedProperties: Sized {
    const LAYOUT: TagLayout;

    /// Discriminator value for this variant
    fn kind(&self) -> &str;

    /// Fields of this variant, without the discriminator
    fn to_properties(&self) -> Result<Map<String, Value>, CodecError>;

    /// Strictly decode a normalized document
    fn from_canonical(document: CanonicalDocument) -> Result<Self, CodecError>;
}

/// Serialize a record into a JSON object (helper for implementors)
pub fn to_object<T: Serialize>(kind: &str, value: &T) -> Result<Map<String, Value>, CodecError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(CodecError::NotAnObject(json_type(&other))),
        Err(source) => Err(CodecError::Invalid {
            kind: kind.to_string(),
            source,
        }),
    }
}

/// Strictly decode canonical properties into `T` (helper for implementors)
pub fn from_object<T: DeserializeOwned>(
    kind: &str,
    properties: Map<String, Value>,
) -> Result<T, CodecError> {
    serde_json::from_value(Value::Object(properties)).map_err(|source| CodecError::Invalid {
        kind: kind.to_string(),
        source,
    })
}

/// Produce the exact document shape the API expects
pub fn encode<T: TaggedProperties>(value: &T) -> Result<Value, CodecError> {
    let properties = value.to_properties()?;
    let mut document = Map::new();
    match T::LAYOUT {
        TagLayout::Adjacent { tag, content } => {
            document.insert(tag.to_string(), Value::String(value.kind().to_string()));
            document.insert(content.to_string(), Value::Object(properties));
        }
        TagLayout::Internal { tag } => {
            document.insert(tag.to_string(), Value::String(value.kind().to_string()));
            document.extend(properties);
        }
    }
    Ok(Value::Object(document))
}

/// Decode a document, optionally requiring a specific discriminator
///
/// Returns `Ok(None)` when the document (or, for adjacent layouts, its
/// content) is absent, so the caller can leave the fields unset. The
/// discriminator is checked against `expected_kind` first, content or not.
pub fn decode<T: TaggedProperties>(
    document: &Value,
    expected_kind: Option<&str>,
) -> Result<Option<T>, CodecError> {
    if let Some(expected) = expected_kind
        && let Some(actual) = tag_of(document, T::LAYOUT)?
        && actual != expected
    {
        return Err(CodecError::UnexpectedKind {
            expected: expected.to_string(),
            actual,
        });
    }
    let Some(canonical) = normalize(document, T::LAYOUT)? else {
        return Ok(None);
    };
    T::from_canonical(canonical).map(Some)
}

/// The discriminator, read even when the content is absent
fn tag_of(document: &Value, layout: TagLayout) -> Result<Option<String>, CodecError> {
    let tag = match layout {
        TagLayout::Adjacent { tag, .. } | TagLayout::Internal { tag } => tag,
    };
    Ok(as_object(document)?.and_then(|mut object| match object.remove(tag) {
        Some(Value::String(kind)) => Some(kind),
        _ => None,
    }))
}

/// First decoding step: bring a loosely typed document into canonical form
pub fn normalize(document: &Value, layout: TagLayout) -> Result<Option<CanonicalDocument>, CodecError> {
    let Some(mut object) = as_object(document)? else {
        return Ok(None);
    };

    let (kind, properties) = match layout {
        TagLayout::Adjacent { tag, content } => {
            let content = object.remove(content).unwrap_or(Value::Null);
            let Some(properties) = as_object(&content)? else {
                return Ok(None);
            };
            (take_tag(&mut object, tag)?, properties)
        }
        TagLayout::Internal { tag } => {
            let kind = take_tag(&mut object, tag)?;
            (kind, object)
        }
    };

    Ok(Some(CanonicalDocument {
        kind,
        properties: strip_nulls(properties),
    }))
}

fn take_tag(object: &mut Map<String, Value>, tag: &'static str) -> Result<String, CodecError> {
    match object.remove(tag) {
        Some(Value::String(kind)) => Ok(kind),
        _ => Err(CodecError::MissingTag(tag)),
    }
}

/// Accept an object, a JSON string holding an object, or null
fn as_object(value: &Value) -> Result<Option<Map<String, Value>>, CodecError> {
    match value {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(map.clone())),
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Ok(Some(map)),
            Ok(Value::Null) => Ok(None),
            _ => Err(CodecError::NotAnObject("string")),
        },
        other => Err(CodecError::NotAnObject(json_type(other))),
    }
}

fn strip_nulls(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| match v {
            Value::Object(inner) => (k, Value::Object(strip_nulls(inner))),
            other => (k, other),
        })
        .collect()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

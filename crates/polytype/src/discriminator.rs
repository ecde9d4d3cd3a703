//! Locating the discriminator in a parsed JSON object.

use serde::de::{Error as _, Unexpected};
use serde_json::{Map, Value};

use crate::error::PolyTypeError;

/// Canonical discriminator key.
pub const TYPE_KEY: &str = "type";

const TYPE_KEY_TITLE: &str = "Type";

/// Reads the discriminator of `payload`.
///
/// `"type"` wins over `"Type"`, which wins over any other ASCII-case spelling
/// of the key (the first one in document order).
pub fn find(payload: &Value) -> Result<&str, PolyTypeError> {
    let Value::Object(fields) = payload else {
        return Err(PolyTypeError::MalformedInput(serde_json::Error::invalid_type(
            unexpected(payload),
            &"a JSON object",
        )));
    };
    match tag(fields) {
        None | Some(Value::Null) => Err(PolyTypeError::EmptyDiscriminator),
        Some(Value::String(name)) if name.is_empty() => Err(PolyTypeError::EmptyDiscriminator),
        Some(Value::String(name)) => Ok(name),
        Some(other) => Err(PolyTypeError::MalformedInput(serde_json::Error::invalid_type(
            unexpected(other),
            &"a discriminator string",
        ))),
    }
}

fn tag(fields: &Map<String, Value>) -> Option<&Value> {
    fields
        .get(TYPE_KEY)
        .or_else(|| fields.get(TYPE_KEY_TITLE))
        .or_else(|| {
            fields
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(TYPE_KEY))
                .map(|(_, value)| value)
        })
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Unexpected::Unsigned(u)
            } else if let Some(i) = n.as_i64() {
                Unexpected::Signed(i)
            } else {
                n.as_f64()
                    .map_or(Unexpected::Other("number"), Unexpected::Float)
            }
        }
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}

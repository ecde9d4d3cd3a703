//! The polymorphic container.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::PolyTypeError;
use crate::global;
use crate::registry::Registry;
use crate::variant::Variant;

/// Holds one value whose concrete type was chosen by a `"type"` field.
///
/// Decoding reads the discriminator, builds the registered variant and
/// decodes the whole object into it. Encoding writes the held value alone,
/// without the discriminator. An empty container encodes as `null`; decoding
/// `null` fails like any other non-object input (use `Option<PolyType>` for
/// nullable slots).
///
/// The input is buffered as a [`serde_json::Value`], so integers outside the
/// `i64`/`u64` range reach the variant as `f64`.
///
/// Because `PolyType` implements the `serde` traits it can sit anywhere in a
/// derived structure: as a field, in a `Vec`, in a map, at any depth.
#[derive(Default)]
pub struct PolyType {
    value: Option<Box<dyn Variant>>,
}

impl PolyType {
    /// An empty container.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value<T: Variant>(value: T) -> Self {
        Self {
            value: Some(Box::new(value)),
        }
    }

    /// Decodes JSON bytes using the active registry.
    pub fn decode(bytes: &[u8]) -> Result<Self, PolyTypeError> {
        Self::decode_with(&global::active(), bytes)
    }

    /// Decodes JSON bytes using `registry`.
    pub fn decode_with(registry: &Registry, bytes: &[u8]) -> Result<Self, PolyTypeError> {
        let payload: Value = serde_json::from_slice(bytes).map_err(PolyTypeError::MalformedInput)?;
        Self::from_json(registry, &payload)
    }

    /// Decodes an already parsed JSON value using `registry`.
    pub fn from_json(registry: &Registry, payload: &Value) -> Result<Self, PolyTypeError> {
        Ok(Self {
            value: Some(registry.resolve(payload)?),
        })
    }

    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn encode_to_string(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn value(&self) -> Option<&(dyn Variant + 'static)> {
        self.value.as_deref()
    }

    pub fn value_mut(&mut self) -> Option<&mut (dyn Variant + 'static)> {
        self.value.as_deref_mut()
    }

    pub fn set_value<T: Variant>(&mut self, value: T) {
        self.value = Some(Box::new(value));
    }

    pub fn set_boxed(&mut self, value: Box<dyn Variant>) {
        self.value = Some(value);
    }

    pub fn take(&mut self) -> Option<Box<dyn Variant>> {
        self.value.take()
    }

    pub fn clear(&mut self) {
        self.value = None;
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    pub fn into_inner(self) -> Option<Box<dyn Variant>> {
        self.value
    }

    pub fn is<T: Variant>(&self) -> bool {
        self.value().is_some_and(|value| value.is::<T>())
    }

    pub fn downcast_ref<T: Variant>(&self) -> Option<&T> {
        self.value()?.downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Variant>(&mut self) -> Option<&mut T> {
        self.value_mut()?.downcast_mut::<T>()
    }
}

impl From<Box<dyn Variant>> for PolyType {
    fn from(value: Box<dyn Variant>) -> Self {
        Self { value: Some(value) }
    }
}

impl Serialize for PolyType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.value {
            Some(value) => value.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for PolyType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let payload = Value::deserialize(deserializer)?;
        Self::from_json(&global::active(), &payload).map_err(D::Error::custom)
    }
}

impl fmt::Debug for PolyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => match serde_json::to_string(value) {
                Ok(json) => write!(f, "PolyType({} {json})", value.variant_name()),
                Err(_) => f
                    .debug_tuple("PolyType")
                    .field(&value.variant_name())
                    .finish(),
            },
            None => f.write_str("PolyType(None)"),
        }
    }
}

//! The capability every registered concrete type provides.

use std::any::{self, Any};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// A concrete type that a [`PolyType`](crate::PolyType) can hold.
///
/// Implemented for every `Serialize + DeserializeOwned + Send + Sync + 'static`
/// type, so client code only derives `serde` traits on its variants.
pub trait Variant: erased_serde::Serialize + Any + Send + Sync {
    /// Decodes `payload` into `self`.
    ///
    /// Fields present in `payload` overwrite the current ones; fields it
    /// omits keep the values `self` already holds.
    fn decode_from(&mut self, payload: &Value) -> Result<(), serde_json::Error>;

    /// Rust type name of the concrete variant, for diagnostics.
    fn variant_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

erased_serde::serialize_trait_object!(Variant);

impl<T> Variant for T
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn decode_from(&mut self, payload: &Value) -> Result<(), serde_json::Error> {
        // A current value that does not encode as JSON cannot be merged.
        let merged = match serde_json::to_value(&*self) {
            Ok(mut current) => {
                overlay(&mut current, payload);
                current
            }
            Err(_) => payload.clone(),
        };
        *self = T::deserialize(merged)?;
        Ok(())
    }

    fn variant_name(&self) -> &'static str {
        any::type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Merges `payload` over `target`: objects merge key by key, recursively;
/// anything else replaces.
fn overlay(target: &mut Value, payload: &Value) {
    match (target, payload) {
        (Value::Object(current), Value::Object(fields)) => {
            for (key, value) in fields {
                match current.get_mut(key) {
                    Some(slot) => overlay(slot, value),
                    None => {
                        current.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, payload) => *target = payload.clone(),
    }
}

impl<'a> dyn Variant + 'a {
    /// Returns `true` if the held concrete type is `T`.
    pub fn is<T: Variant>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Variant>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Variant>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

impl dyn Variant {
    /// Recovers the concrete box, or gives the original back on mismatch.
    pub fn downcast<T: Variant>(self: Box<Self>) -> Result<Box<T>, Box<dyn Variant>> {
        if self.is::<T>() {
            match self.into_any().downcast::<T>() {
                Ok(concrete) => Ok(concrete),
                Err(_) => unreachable!("type checked above"),
            }
        } else {
            Err(self)
        }
    }
}

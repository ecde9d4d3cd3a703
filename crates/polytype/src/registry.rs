//! Discriminator to factory mapping.

use std::any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::discriminator;
use crate::error::PolyTypeError;
use crate::global;
use crate::variant::Variant;

pub(crate) type FactoryFn = dyn Fn() -> Box<dyn Variant> + Send + Sync;

/// A type-erased zero-argument constructor for one variant.
#[derive(Clone)]
pub(crate) struct Factory {
    create: Arc<FactoryFn>,
    variant_name: &'static str,
}

impl Factory {
    pub(crate) fn create(&self) -> Box<dyn Variant> {
        (self.create)()
    }
}

/// Maps discriminator strings to variant factories.
///
/// A registry is meant to be built once during start-up and only read
/// afterwards. It never shrinks: there is no removal operation.
#[derive(Clone, Default)]
pub struct Registry {
    factories: HashMap<String, Factory>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates `factory` with `discriminator`.
    ///
    /// The factory must return a fresh instance on every call.
    ///
    /// # Panics
    ///
    /// Panics if `discriminator` is empty or already registered. Both are
    /// configuration mistakes that must surface at start-up.
    pub fn register<T, F>(&mut self, discriminator: impl Into<String>, factory: F)
    where
        T: Variant,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let create: Arc<FactoryFn> = Arc::new(move || Box::new(factory()) as Box<dyn Variant>);
        self.insert(discriminator.into(), create, any::type_name::<T>());
    }

    /// Registers `T::default` under `discriminator`.
    pub fn register_default<T>(&mut self, discriminator: impl Into<String>)
    where
        T: Variant + Default,
    {
        self.register(discriminator, T::default);
    }

    pub(crate) fn insert(
        &mut self,
        discriminator: String,
        create: Arc<FactoryFn>,
        variant_name: &'static str,
    ) {
        assert!(
            !discriminator.is_empty(),
            "polytype: cannot register {variant_name} under an empty type"
        );
        if self.factories.contains_key(&discriminator) {
            panic!("polytype: type \"{discriminator}\" has already been added");
        }
        tracing::debug!(%discriminator, variant = variant_name, "registered variant");
        self.factories.insert(
            discriminator,
            Factory {
                create,
                variant_name,
            },
        );
    }

    pub(crate) fn lookup(&self, discriminator: &str) -> Option<&Factory> {
        self.factories.get(discriminator)
    }

    pub fn contains(&self, discriminator: &str) -> bool {
        self.factories.contains_key(discriminator)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Registered discriminators in sorted order.
    pub fn discriminators(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Builds the variant named by `payload`'s discriminator and decodes the
    /// whole of `payload` into it.
    pub fn resolve(&self, payload: &Value) -> Result<Box<dyn Variant>, PolyTypeError> {
        let name = discriminator::find(payload)?;
        let factory = self
            .lookup(name)
            .ok_or_else(|| PolyTypeError::UnsupportedType(name.to_owned()))?;
        let mut instance = factory.create();
        instance
            .decode_from(payload)
            .map_err(|source| PolyTypeError::PayloadDecode {
                discriminator: name.to_owned(),
                source,
            })?;
        tracing::trace!(discriminator = name, variant = factory.variant_name, "resolved variant");
        Ok(instance)
    }

    /// Decodes `T` from JSON bytes with this registry active for every
    /// nested [`PolyType`](crate::PolyType).
    pub fn from_slice<T: DeserializeOwned>(self: &Arc<Self>, bytes: &[u8]) -> serde_json::Result<T> {
        global::with_registry(self, || serde_json::from_slice(bytes))
    }

    /// Decodes `T` from JSON text with this registry active.
    pub fn from_str<T: DeserializeOwned>(self: &Arc<Self>, text: &str) -> serde_json::Result<T> {
        global::with_registry(self, || serde_json::from_str(text))
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<(&str, &str)> = self
            .factories
            .iter()
            .map(|(name, factory)| (name.as_str(), factory.variant_name))
            .collect();
        names.sort_unstable();
        f.debug_map().entries(names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct A {
        #[serde(rename = "A", default)]
        a: String,
    }

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct B {
        #[serde(rename = "B", default)]
        b: String,
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register_default::<A>("a");
        registry.register("b", B::default);
        registry
    }

    #[test]
    fn register_and_introspect() {
        let registry = registry();
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
        assert!(registry.contains("a"));
        assert!(!registry.contains("A"));
        assert_eq!(registry.discriminators(), vec!["a", "b"]);
        assert!(Registry::new().is_empty());
    }

    #[test]
    #[should_panic(expected = "polytype: type \"a\" has already been added")]
    fn duplicate_registration_panics() {
        let mut registry = registry();
        registry.register_default::<B>("a");
    }

    #[test]
    #[should_panic(expected = "empty type")]
    fn empty_discriminator_registration_panics() {
        let mut registry = Registry::new();
        registry.register_default::<A>("");
    }

    #[test]
    fn factory_returns_independent_instances() {
        let registry = registry();
        let factory = registry.lookup("a").unwrap();
        let mut first = factory.create();
        first.downcast_mut::<A>().unwrap().a = "changed".into();
        let second = factory.create();
        assert_eq!(second.downcast_ref::<A>(), Some(&A::default()));
    }

    #[test]
    fn resolve_matrix() {
        let registry = registry();
        let a = registry
            .resolve(&json!({"type": "a", "A": "This is A", "C": "ignored"}))
            .unwrap();
        assert_eq!(a.downcast_ref::<A>(), Some(&A { a: "This is A".into() }));

        let b = registry.resolve(&json!({"Type": "b", "A": "x", "B": "This is B"})).unwrap();
        assert_eq!(b.downcast_ref::<B>(), Some(&B { b: "This is B".into() }));

        let err = registry.resolve(&json!({"type": "c"})).err().unwrap();
        assert!(matches!(&err, PolyTypeError::UnsupportedType(name) if name == "c"));
        assert_eq!(err.to_string(), "type \"c\" is not supported");

        let err = registry.resolve(&json!({"type": "a", "A": 1})).err().unwrap();
        assert!(matches!(&err, PolyTypeError::PayloadDecode { discriminator, .. } if discriminator == "a"));
    }

    #[test]
    fn factory_values_are_overwritten_by_payload() {
        let mut registry = Registry::new();
        registry.register("a", || A { a: "preset".into() });
        let a = registry.resolve(&json!({"type": "a", "A": "decoded"})).unwrap();
        assert_eq!(a.downcast_ref::<A>().unwrap().a, "decoded");
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Plain {
        #[serde(rename = "A")]
        a: String,
        count: u8,
    }

    #[test]
    fn factory_presets_survive_absent_fields() {
        let mut registry = Registry::new();
        registry.register("plain", || Plain {
            a: "preset".into(),
            count: 3,
        });
        let plain = registry.resolve(&json!({"type": "plain", "count": 4})).unwrap();
        assert_eq!(
            plain.downcast_ref::<Plain>(),
            Some(&Plain {
                a: "preset".into(),
                count: 4,
            })
        );
    }

    #[test]
    fn plain_struct_decodes_with_only_a_discriminator() {
        let mut registry = Registry::new();
        registry.register("plain", || Plain {
            a: String::new(),
            count: 0,
        });
        let plain = registry.resolve(&json!({"type": "plain"})).unwrap();
        assert_eq!(
            plain.downcast_ref::<Plain>(),
            Some(&Plain {
                a: String::new(),
                count: 0,
            })
        );
    }

    #[test]
    fn debug_lists_variants() {
        let text = format!("{:?}", registry());
        assert!(text.starts_with("{\"a\": "), "{text}");
        assert!(text.contains("\"b\": "), "{text}");
    }
}

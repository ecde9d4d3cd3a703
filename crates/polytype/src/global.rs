//! The registry consulted by [`PolyType`](crate::PolyType)'s `Deserialize`
//! impl.
//!
//! A thread may activate an explicit registry with [`with_registry`];
//! otherwise the process-wide default registry is used. The default registry
//! starts with every [`register_variant!`](crate::register_variant)
//! submission and grows through [`register`] and [`register_default`].

use std::any;
use std::cell::RefCell;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use crate::registry::Registry;
use crate::variant::Variant;

/// A link-time registration collected by [`register_variant!`](crate::register_variant).
pub struct VariantRegistration {
    discriminator: &'static str,
    factory: fn() -> Box<dyn Variant>,
    variant_name: fn() -> &'static str,
}

impl VariantRegistration {
    pub const fn new(
        discriminator: &'static str,
        factory: fn() -> Box<dyn Variant>,
        variant_name: fn() -> &'static str,
    ) -> Self {
        Self {
            discriminator,
            factory,
            variant_name,
        }
    }
}

inventory::collect!(VariantRegistration);

#[doc(hidden)]
pub fn default_factory<T: Variant + Default>() -> Box<dyn Variant> {
    Box::new(T::default())
}

#[doc(hidden)]
pub fn type_name_of<T>() -> &'static str {
    any::type_name::<T>()
}

static DEFAULT: LazyLock<RwLock<Arc<Registry>>> = LazyLock::new(|| {
    let mut registry = Registry::new();
    for entry in inventory::iter::<VariantRegistration> {
        registry.insert(
            entry.discriminator.to_owned(),
            Arc::new(entry.factory),
            (entry.variant_name)(),
        );
    }
    RwLock::new(Arc::new(registry))
});

thread_local! {
    static SCOPED: RefCell<Option<Arc<Registry>>> = const { RefCell::new(None) };
}

/// Registers `factory` under `discriminator` in the default registry.
///
/// # Panics
///
/// Panics on an empty or duplicate discriminator, like
/// [`Registry::register`].
pub fn register<T, F>(discriminator: impl Into<String>, factory: F)
where
    T: Variant,
    F: Fn() -> T + Send + Sync + 'static,
{
    let mut current = DEFAULT.write().unwrap_or_else(PoisonError::into_inner);
    Arc::make_mut(&mut current).register(discriminator, factory);
}

/// Registers `T::default` under `discriminator` in the default registry.
pub fn register_default<T>(discriminator: impl Into<String>)
where
    T: Variant + Default,
{
    register(discriminator, T::default);
}

/// Snapshot of the default registry.
///
/// # Panics
///
/// The first call panics if two [`register_variant!`] entries share a
/// discriminator.
pub fn global() -> Arc<Registry> {
    Arc::clone(&DEFAULT.read().unwrap_or_else(PoisonError::into_inner))
}

/// Runs `f` with `registry` active on the current thread.
///
/// Scopes nest; the previous registry is restored when `f` returns or
/// unwinds.
pub fn with_registry<R>(registry: &Arc<Registry>, f: impl FnOnce() -> R) -> R {
    let previous = SCOPED.with(|scoped| scoped.replace(Some(Arc::clone(registry))));
    let _restore = Restore(previous);
    f()
}

struct Restore(Option<Arc<Registry>>);

impl Drop for Restore {
    fn drop(&mut self) {
        let previous = self.0.take();
        SCOPED.with(|scoped| *scoped.borrow_mut() = previous);
    }
}

/// The registry decoding should use on this thread right now.
pub(crate) fn active() -> Arc<Registry> {
    SCOPED
        .with(|scoped| scoped.borrow().clone())
        .unwrap_or_else(global)
}

/// Registers a `Default` variant under a discriminator at link time.
///
/// The registration is installed into the default registry the first time
/// it is used.
///
/// ```
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Default, Serialize, Deserialize)]
/// struct Circle {
///     radius: f64,
/// }
///
/// polytype::register_variant!(Circle, "circle");
///
/// fn main() {
///     assert!(polytype::global().contains("circle"));
/// }
/// ```
#[macro_export]
macro_rules! register_variant {
    ($ty:ty, $discriminator:expr $(,)?) => {
        $crate::inventory::submit! {
            $crate::VariantRegistration::new(
                $discriminator,
                $crate::__private::default_factory::<$ty>,
                $crate::__private::type_name_of::<$ty>,
            )
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::panic::AssertUnwindSafe;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Marker {
        id: u32,
    }

    crate::register_variant!(Marker, "global-tests-marker");

    #[test]
    fn link_time_registration_is_installed() {
        assert!(global().contains("global-tests-marker"));
    }

    #[test]
    fn runtime_registration_is_visible_in_new_snapshots() {
        let before = global();
        register_default::<Marker>("global-tests-runtime");
        assert!(!before.contains("global-tests-runtime"));
        assert!(global().contains("global-tests-runtime"));
    }

    #[test]
    fn scopes_nest_and_restore() {
        let mut outer = Registry::new();
        outer.register_default::<Marker>("outer");
        let outer = Arc::new(outer);
        let inner = Arc::new(Registry::new());

        with_registry(&outer, || {
            assert!(active().contains("outer"));
            with_registry(&inner, || assert!(active().is_empty()));
            assert!(active().contains("outer"));
        });
        assert!(active().contains("global-tests-marker"));
    }

    #[test]
    fn scope_is_restored_after_panic() {
        let scoped = Arc::new(Registry::new());
        let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
            with_registry(&scoped, || panic!("boom"));
        }));
        assert!(result.is_err());
        assert!(active().contains("global-tests-marker"));
    }
}

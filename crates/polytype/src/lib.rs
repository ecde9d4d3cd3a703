//! polytype - discriminator-dispatched polymorphic JSON values.
//!
//! A [`PolyType`] decodes a JSON object by reading its `"type"` (or `"Type"`)
//! field, building the variant registered under that name in a [`Registry`]
//! and decoding the whole object into it. Encoding writes the held variant
//! alone; the discriminator is never written back.
//!
//! # Overview
//!
//! - [`PolyType`] - the container, usable anywhere `serde` traverses
//! - [`Registry`] - discriminator to factory mapping
//! - [`Variant`] - the capability every registered type has
//! - [`with_registry`] / [`register`] / [`register_variant!`] - choosing
//!   which registry decoding consults
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use polytype::{PolyType, Registry};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
//! struct Gopher {
//!     #[serde(rename = "G")]
//!     g: String,
//! }
//!
//! #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
//! struct Beaver {
//!     #[serde(rename = "B")]
//!     b: String,
//! }
//!
//! let mut registry = Registry::new();
//! registry.register_default::<Gopher>("go");
//! registry.register("br", Beaver::default);
//! let registry = Arc::new(registry);
//!
//! let zoo: Vec<PolyType> = registry
//!     .from_str(r#"[{"type":"go","G":"gopher"},{"Type":"br","B":"beaver"}]"#)
//!     .unwrap();
//! assert_eq!(zoo[0].downcast_ref::<Gopher>().unwrap().g, "gopher");
//! assert_eq!(zoo[1].downcast_ref::<Beaver>().unwrap().b, "beaver");
//!
//! let json = serde_json::to_string(&zoo).unwrap();
//! assert_eq!(json, r#"[{"G":"gopher"},{"B":"beaver"}]"#);
//! ```

mod container;
mod discriminator;
mod error;
mod global;
mod registry;
mod variant;

pub use container::PolyType;
pub use discriminator::TYPE_KEY;
pub use error::PolyTypeError;
pub use global::{global, register, register_default, with_registry, VariantRegistration};
pub use registry::Registry;
pub use variant::Variant;

#[doc(hidden)]
pub use inventory;

#[doc(hidden)]
pub mod __private {
    pub use crate::global::{default_factory, type_name_of};
}

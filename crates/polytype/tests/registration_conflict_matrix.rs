//! Two link-time registrations claiming one discriminator. Building the
//! default registry fails, so this suite lives in its own test binary.

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
struct First {
    first: u8,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Second {
    second: u8,
}

polytype::register_variant!(First, "dup");
polytype::register_variant!(Second, "dup");

#[test]
#[should_panic(expected = "polytype: type \"dup\" has already been added")]
fn conflicting_link_time_registrations_panic_on_first_use() {
    polytype::global();
}

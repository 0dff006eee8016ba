//! Test: A member whose type has no field view.
//!
//! External types like `std::time::SystemTime` don't implement `IntoValue`.
//! Wrap them in `Opaque` or convert them to a supported type.

use data_permission::Entity;
use std::time::SystemTime;

#[derive(Entity)]
#[permission(entity = "Event")]
struct Event {
    // ERROR: SystemTime doesn't implement IntoValue
    timestamp: SystemTime,
}

fn main() {}

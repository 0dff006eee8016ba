//! Test: Deriving Entity on an enum.
//!
//! Records are structs with named or positional members. Enums have no single
//! field view and are rejected.

use data_permission::Entity;

#[derive(Entity)]
#[permission(entity = "Status")]
enum Status {
    Open,
    Closed,
}

fn main() {}

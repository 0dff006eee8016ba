//! Test: An empty entity name.
//!
//! Entity names are global registry keys and must not be empty.

use data_permission::Entity;

#[derive(Entity)]
#[permission(entity = "")]
struct Order {
    #[permission(field)]
    amount: u64,
}

fn main() {}

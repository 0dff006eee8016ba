//! Test: Flattening a member whose type does not derive Entity.
//!
//! Flattened members contribute their declaration, so the member type must
//! implement `Entity`.

use data_permission::Entity;

struct Audit {
    created_by: String,
}

#[derive(Entity)]
#[permission(entity = "Order")]
struct Order {
    amount: u64,
    #[permission(flatten)]
    audit: Audit,
}

fn main() {}

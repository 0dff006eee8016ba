//! Test: A member that is both permission controlled and ignored.
//!
//! `#[permission(field)]`, `#[permission(ignore)]` and `#[permission(flatten)]`
//! are mutually exclusive.

use data_permission::Entity;

#[derive(Entity)]
#[permission(entity = "Order")]
struct Order {
    #[permission(field)]
    #[permission(ignore)]
    amount: u64,
}

fn main() {}

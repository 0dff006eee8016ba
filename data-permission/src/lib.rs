//! Field-level data permission redaction.
//!
//! Responses leaving a service are walked as a graph of [`Value`]s. Records
//! whose type is declared under an *entity* have their permission-controlled
//! members checked against the caller's [`Grants`]; members the grant does not
//! allow are removed. Everything else passes through.
//!
//! Key rules:
//! - An entity missing from the grants is not restricted at all.
//! - Members without a field declaration are never removed.
//! - Cycles and shared records are visited once per call.
//! - Redaction never fails the call. Faults keep the original value unless
//!   [`FaultPolicy::Strict`] is configured.
//!
//! The pieces:
//! - [`Entity`] declarations, usually from `#[derive(Entity)]`, collected into
//!   an [`EntityRegistry`] at startup
//! - a [`PermissionProvider`] answering "which fields may this caller see"
//! - [`redact`] / [`GraphWalker`] for direct use, [`Interceptor`] for the
//!   response wrapper of a service
//!
//! ```
//! use data_permission::{redact, EntityRegistry, FieldMap, Grants, Record, RecordType, Value};
//!
//! let registry = EntityRegistry::builder()
//!     .register_entity(
//!         "Order",
//!         RecordType::new("shop::Order"),
//!         [("amount", "amount"), ("customer_name", "customerName")],
//!         Vec::<String>::new(),
//!     )
//!     .build();
//! let order = Record::new(
//!     RecordType::new("shop::Order"),
//!     FieldMap::new().with("amount", 100).with("customer_name", "Alice").with("id", 7),
//! );
//! let grants = Grants::new().allow("Order", ["amount"]);
//!
//! let out = redact(&Value::Record(order), &registry, &grants);
//! let fields = out.as_object().unwrap();
//! assert_eq!(fields.names().collect::<Vec<_>>(), ["amount", "id"]);
//! ```
//!
//! The `Entity` derive macro lives in `data-permission-derive` and is
//! re-exported when the `derive` feature is enabled.

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::default_trait_access,
    clippy::doc_markdown,
    clippy::if_not_else,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::needless_ifs,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::enum_glob_use,
    clippy::struct_excessive_bools,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::result_large_err,
    clippy::future_not_send,
    clippy::option_if_let_else,
    clippy::from_over_into,
    clippy::manual_inspect
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

#[cfg(feature = "derive")]
pub use data_permission_derive::Entity;

#[allow(unused_extern_crates)]
extern crate self as data_permission;

// Module declarations
mod config;
mod convert;
mod declaration;
mod error;
mod grant;
mod intercept;
#[cfg(feature = "json")]
mod json;
mod provider;
mod record;
mod redaction;
mod registry;
mod ser;
mod value;

// Re-exports
pub use config::Settings;
pub use convert::IntoValue;
pub use declaration::{Declaration, Entity, FieldDeclaration};
pub use error::{ConfigurationError, DiscoveryError, InterceptError, RedactionError};
pub use grant::{EntityGrant, Grants};
pub use intercept::Interceptor;
pub use provider::{CallContext, PermissionProvider, StaticPermissionProvider};
pub use record::{Record, RecordId, RecordType};
pub use redaction::{redact, FaultPolicy, GraphWalker, Redacted, VisitedSet, DEFAULT_MAX_DEPTH};
pub use registry::{EntityDeclaration, EntityRegistry, EntityRegistryBuilder};
pub use value::{FieldMap, Mapping, Opaque, Value};

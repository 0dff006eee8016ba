//! Derive macro for `data-permission`.
//!
//! This crate generates the declaration behind `#[derive(Entity)]`. It:
//! - reads `#[permission(...)]` container and field attributes
//! - emits an `Entity` implementation carrying the record type and declaration
//! - emits an `IntoValue` implementation producing the record's field view
//!
//! It does **not** register anything. Registration is explicit and happens
//! when the generated declarations are handed to the entity registry.

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

#[allow(unused_extern_crates)]
extern crate proc_macro;

use proc_macro2::TokenStream;
use proc_macro_crate::{crate_name, FoundCrate};
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, Data, DeriveInput, Result};

mod container;
mod derive_struct;
mod generics;
mod strategy;
mod types;
use container::{parse_container_options, ContainerOptions};
use derive_struct::{derive_struct, StructDeriveOutput};
use generics::add_bounds;

/// Derives `data_permission::Entity` and `data_permission::IntoValue` for structs.
///
/// # Container Attributes
///
/// - `#[permission(entity = "Order")]` - Declares the entity the type belongs to. Without it the
///   type still has a declaration, useful as a flattened ancestor of other entities.
/// - `#[permission(record_type = "api::Response")]` - Overrides the record type, which defaults
///   to `module_path!()::TypeName`. Generic parameters are not part of the record type.
/// - `#[permission(ignore)]` - Excludes the type from discovery and redaction. Its records pass
///   through untouched.
///
/// # Field Attributes
///
/// - **No annotation**: The member is part of the field view but never removed.
/// - `#[permission(field)]` - The member is permission controlled under its own name.
/// - `#[permission(field = "customerName")]` - The member is permission controlled under the
///   given permission field name.
/// - `#[permission(ignore)]` - The member is not declared, not descended into and never removed.
/// - `#[permission(flatten)]` - The member's own members are spliced into the field view and its
///   declaration is inherited. The member type must implement `Entity`.
///
/// `PhantomData` members are left out of the field view. Enums and unions are rejected at
/// compile time.
#[proc_macro_derive(Entity, attributes(permission))]
pub fn derive_entity(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

/// Returns the token stream to reference the data-permission crate root.
///
/// Handles crate renaming (e.g., `perm = { package = "data-permission", ... }`).
/// Inside the crate itself `::data_permission` resolves through its
/// `extern crate self` alias.
fn crate_root() -> TokenStream {
    match crate_name("data-permission") {
        Ok(FoundCrate::Name(name)) => {
            let ident = format_ident!("{}", name);
            quote! { ::#ident }
        }
        Ok(FoundCrate::Itself) | Err(_) => quote! { ::data_permission },
    }
}

fn expand(input: DeriveInput) -> Result<TokenStream> {
    let DeriveInput {
        ident,
        generics,
        data,
        attrs,
        ..
    } = input;

    let ContainerOptions {
        entity,
        record_type,
        ignore,
    } = parse_container_options(&attrs)?;

    let crate_root = crate_root();

    let StructDeriveOutput {
        field_view_body,
        declaration_chain,
        value_generics,
        entity_generics,
    } = match &data {
        Data::Struct(data) => derive_struct(data, &generics, &crate_root)?,
        Data::Enum(e) => {
            return Err(syn::Error::new(
                e.enum_token.span(),
                "`Entity` cannot be derived for enums; records are structs",
            ));
        }
        Data::Union(u) => {
            return Err(syn::Error::new(
                u.union_token.span(),
                "`Entity` cannot be derived for unions",
            ));
        }
    };

    let bounded = add_bounds(
        generics,
        &value_generics,
        &quote! { #crate_root::IntoValue },
    );
    let bounded = add_bounds(bounded, &entity_generics, &quote! { #crate_root::Entity });
    let (impl_generics, ty_generics, where_clause) = bounded.split_for_impl();

    let record_type = record_type.map_or_else(
        || quote! { ::core::concat!(::core::module_path!(), "::", ::core::stringify!(#ident)) },
        |record_type| quote! { #record_type },
    );
    let entity = entity.map(|name| quote! { .entity(#name) });
    let ignored = ignore.then(|| quote! { .ignored() });

    Ok(quote! {
        impl #impl_generics #crate_root::Entity for #ident #ty_generics #where_clause {
            fn record_type() -> #crate_root::RecordType {
                #crate_root::RecordType::from_static(#record_type)
            }

            fn declaration() -> #crate_root::Declaration {
                #crate_root::Declaration::new(<Self as #crate_root::Entity>::record_type())
                    #entity
                    #ignored
                    #declaration_chain
            }
        }

        impl #impl_generics #crate_root::IntoValue for #ident #ty_generics #where_clause {
            fn into_value(self) -> #crate_root::Value {
                #field_view_body
                #crate_root::Value::Record(#crate_root::Record::new(
                    <Self as #crate_root::Entity>::record_type(),
                    __permission_fields,
                ))
            }
        }
    })
}

//! Generic type parameter handling and trait bound management.
//!
//! Bounds are added only for generics that appear in the field view: members
//! converted with `IntoValue` and flattened members, which need `Entity`.
//!
//! ## PhantomData Handling
//!
//! `PhantomData<T>` members are left out of the field view, so they add no
//! bounds:
//!
//! ```ignore
//! struct TypedId<T> {
//!     id: String,
//!     _marker: PhantomData<T>,  // T does not need IntoValue
//! }
//! ```

use proc_macro2::TokenStream;
use syn::{parse_quote, Ident};

use crate::types::is_phantom_data;

pub(crate) fn collect_generics_from_type(
    ty: &syn::Type,
    generics: &syn::Generics,
    result: &mut Vec<Ident>,
) {
    match ty {
        syn::Type::Path(path) => {
            if is_phantom_data(ty) {
                return;
            }
            for segment in &path.path.segments {
                if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                    for arg in &args.args {
                        if let syn::GenericArgument::Type(inner_ty) = arg {
                            collect_generics_from_type(inner_ty, generics, result);
                        }
                    }
                }
            }
            if let Some(segment) = path.path.segments.first() {
                for param in generics.type_params() {
                    if segment.ident == param.ident && !result.iter().any(|g| g == &param.ident) {
                        result.push(param.ident.clone());
                    }
                }
            }
        }
        syn::Type::Array(array) => collect_generics_from_type(&array.elem, generics, result),
        syn::Type::Slice(slice) => collect_generics_from_type(&slice.elem, generics, result),
        syn::Type::Paren(paren) => collect_generics_from_type(&paren.elem, generics, result),
        syn::Type::Group(group) => collect_generics_from_type(&group.elem, generics, result),
        syn::Type::Reference(reference) => {
            collect_generics_from_type(&reference.elem, generics, result);
        }
        syn::Type::Tuple(tuple) => {
            for elem in &tuple.elems {
                collect_generics_from_type(elem, generics, result);
            }
        }
        _ => {}
    }
}

/// Adds `bound` to every generic parameter in `used_generics`.
pub(crate) fn add_bounds(
    mut generics: syn::Generics,
    used_generics: &[Ident],
    bound: &TokenStream,
) -> syn::Generics {
    for param in generics.type_params_mut() {
        if used_generics.iter().any(|g| g == &param.ident) {
            param.bounds.push(parse_quote!(#bound));
        }
    }
    generics
}

//! Struct-specific `Entity` derivation.
//!
//! This module generates the field view conversion and the declaration chain
//! for struct members, and collects generic parameters that require bounds.

use proc_macro2::{Ident, Span, TokenStream};
use quote::{format_ident, quote, quote_spanned};
use syn::{ext::IdentExt, spanned::Spanned, DataStruct, Fields, LitStr, Result};

use crate::{
    generics::collect_generics_from_type,
    strategy::{parse_field_strategy, Strategy},
    types::is_phantom_data,
};

pub(crate) struct StructDeriveOutput {
    /// Statements filling `__permission_fields` from the destructured members.
    pub(crate) field_view_body: TokenStream,
    /// Builder calls appended to `Declaration::new(..)`.
    pub(crate) declaration_chain: TokenStream,
    /// Generics that need `IntoValue`.
    pub(crate) value_generics: Vec<Ident>,
    /// Generics that need `Entity`.
    pub(crate) entity_generics: Vec<Ident>,
}

/// One member of the struct as seen by the generated code.
struct Member<'a> {
    name: LitStr,
    binding: Ident,
    ty: &'a syn::Type,
    span: Span,
    strategy: Strategy,
}

pub(crate) fn derive_struct(
    data: &DataStruct,
    generics: &syn::Generics,
    crate_root: &TokenStream,
) -> Result<StructDeriveOutput> {
    let mut members = Vec::new();
    let mut pattern = Vec::new();

    match &data.fields {
        Fields::Named(fields) => {
            for field in &fields.named {
                let Some(ident) = field.ident.as_ref() else {
                    continue;
                };
                let strategy = parse_field_strategy(&field.attrs)?;
                if is_phantom_data(&field.ty) {
                    continue;
                }
                pattern.push(quote! { #ident });
                members.push(Member {
                    name: LitStr::new(&ident.unraw().to_string(), ident.span()),
                    binding: ident.clone(),
                    ty: &field.ty,
                    span: field.span(),
                    strategy,
                });
            }
        }
        Fields::Unnamed(fields) => {
            for (index, field) in fields.unnamed.iter().enumerate() {
                let strategy = parse_field_strategy(&field.attrs)?;
                if is_phantom_data(&field.ty) {
                    pattern.push(quote! { _ });
                    continue;
                }
                let binding = format_ident!("field_{index}");
                pattern.push(quote! { #binding });
                members.push(Member {
                    name: LitStr::new(&index.to_string(), field.span()),
                    binding,
                    ty: &field.ty,
                    span: field.span(),
                    strategy,
                });
            }
        }
        Fields::Unit => {}
    }

    let destructure = match &data.fields {
        Fields::Named(_) => quote! { let Self { #(#pattern,)* .. } = self; },
        Fields::Unnamed(_) => quote! { let Self ( #(#pattern),* ) = self; },
        Fields::Unit => quote! { let _ = self; },
    };

    let mut inserts = Vec::with_capacity(members.len());
    let mut chain = Vec::with_capacity(members.len());
    let mut value_generics = Vec::new();
    let mut entity_generics = Vec::new();

    for Member {
        name,
        binding,
        ty,
        span,
        strategy,
    } in &members
    {
        let span = *span;
        if let Strategy::Flatten = strategy {
            collect_generics_from_type(ty, generics, &mut entity_generics);
            inserts.push(quote_spanned! { span =>
                __permission_fields.flatten(#name, #crate_root::IntoValue::into_value(#binding));
            });
            chain.push(quote_spanned! { span =>
                .extends(<#ty as #crate_root::Entity>::declaration())
            });
            continue;
        }

        collect_generics_from_type(ty, generics, &mut value_generics);
        inserts.push(quote_spanned! { span =>
            __permission_fields.insert(#name, #crate_root::IntoValue::into_value(#binding));
        });
        match strategy {
            Strategy::Field(Some(permission)) => chain.push(quote! { .field(#name, #permission) }),
            Strategy::Field(None) => chain.push(quote! { .field(#name, #name) }),
            Strategy::Ignore => chain.push(quote! { .ignore_member(#name) }),
            Strategy::Plain | Strategy::Flatten => {}
        }
    }

    let capacity = members.len();
    Ok(StructDeriveOutput {
        field_view_body: quote! {
            #destructure
            #[allow(unused_mut)]
            let mut __permission_fields = #crate_root::FieldMap::with_capacity(#capacity);
            #(#inserts)*
        },
        declaration_chain: quote! { #(#chain)* },
        value_generics,
        entity_generics,
    })
}

#[cfg(test)]
mod tests {
    use quote::quote;
    use syn::{Data, DeriveInput};

    use super::*;

    fn expand(tokens: TokenStream) -> Result<StructDeriveOutput> {
        let input: DeriveInput = syn::parse2(tokens).expect("should parse as DeriveInput");
        let Data::Struct(data) = &input.data else {
            panic!("expected a struct");
        };
        derive_struct(data, &input.generics, &quote! { ::data_permission })
    }

    #[test]
    fn declared_members_end_up_in_the_chain() {
        let output = expand(quote! {
            struct Order {
                #[permission(field = "customerName")]
                customer_name: String,
                #[permission(field)]
                amount: u64,
                #[permission(ignore)]
                note: String,
                id: u64,
            }
        })
        .unwrap();
        let chain = output.declaration_chain.to_string();
        assert!(chain.contains("\"customer_name\" , \"customerName\""));
        assert!(chain.contains("\"amount\" , \"amount\""));
        assert!(chain.contains("ignore_member (\"note\")"));
        assert!(!chain.contains("\"id\""));
    }

    #[test]
    fn flatten_requires_entity_and_splices_members() {
        let output = expand(quote! {
            struct Order<A> {
                #[permission(flatten)]
                audit: A,
                id: u64,
            }
        })
        .unwrap();
        assert_eq!(output.entity_generics.len(), 1);
        assert!(output.value_generics.is_empty());
        assert!(output.field_view_body.to_string().contains("flatten"));
    }

    #[test]
    fn phantom_members_are_left_out() {
        let output = expand(quote! {
            struct TypedId<T>(u64, PhantomData<T>);
        })
        .unwrap();
        assert!(output.value_generics.is_empty());
        let body = output.field_view_body.to_string();
        assert!(body.contains("field_0"));
        assert!(!body.contains("field_1"));
    }

    #[test]
    fn raw_identifiers_lose_their_prefix() {
        let output = expand(quote! {
            struct Tagged {
                #[permission(field)]
                r#type: String,
            }
        })
        .unwrap();
        assert!(output.declaration_chain.to_string().contains("\"type\""));
    }
}

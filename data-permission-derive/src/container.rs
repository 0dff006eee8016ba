//! Container-level attribute parsing for `#[derive(Entity)]`.
//!
//! This module handles `#[permission(...)]` on the struct itself, not on fields.

use syn::{Attribute, LitStr, Meta, Result};

/// Options parsed from container-level `#[permission(...)]` attributes.
#[derive(Clone, Debug, Default)]
pub(crate) struct ContainerOptions {
    /// Entity the record type belongs to.
    pub(crate) entity: Option<LitStr>,
    /// Overrides the `module::Type` record type.
    pub(crate) record_type: Option<LitStr>,
    /// Excludes the type from discovery and redaction.
    pub(crate) ignore: bool,
}

fn set_once(target: &mut Option<LitStr>, value: LitStr, key: &str) -> Result<()> {
    if target.is_some() {
        return Err(syn::Error::new(
            value.span(),
            format!("duplicate container option `{key}`"),
        ));
    }
    *target = Some(value);
    Ok(())
}

/// Parses container-level `#[permission(...)]` attributes.
pub(crate) fn parse_container_options(attrs: &[Attribute]) -> Result<ContainerOptions> {
    let mut options = ContainerOptions::default();

    for attr in attrs {
        if !attr.path().is_ident("permission") {
            continue;
        }

        let Meta::List(list) = &attr.meta else {
            return Err(syn::Error::new_spanned(
                attr,
                "expected #[permission(entity = \"...\")], #[permission(record_type = \"...\")] \
                 or #[permission(ignore)]",
            ));
        };
        list.parse_nested_meta(|meta| {
            if meta.path.is_ident("entity") {
                let name: LitStr = meta.value()?.parse()?;
                if name.value().trim().is_empty() {
                    return Err(syn::Error::new(name.span(), "entity name must not be empty"));
                }
                set_once(&mut options.entity, name, "entity")
            } else if meta.path.is_ident("record_type") {
                let record_type: LitStr = meta.value()?.parse()?;
                if record_type.value().trim().is_empty() {
                    return Err(syn::Error::new(
                        record_type.span(),
                        "record type must not be empty",
                    ));
                }
                set_once(&mut options.record_type, record_type, "record_type")
            } else if meta.path.is_ident("ignore") {
                options.ignore = true;
                Ok(())
            } else {
                Err(meta.error(format!(
                    "unknown container option `{}`; expected `entity`, `record_type` or `ignore`",
                    meta.path
                        .get_ident()
                        .map_or_else(|| "?".to_string(), ToString::to_string)
                )))
            }
        })?;
    }

    Ok(options)
}

#[cfg(test)]
mod tests {
    use quote::quote;
    use syn::DeriveInput;

    use super::*;

    fn parse_attrs(tokens: proc_macro2::TokenStream) -> Vec<Attribute> {
        let input: DeriveInput = syn::parse2(quote! {
            #tokens
            struct Dummy;
        })
        .expect("should parse as DeriveInput");
        input.attrs
    }

    #[test]
    fn no_attribute_returns_defaults() {
        let options = parse_container_options(&parse_attrs(quote! {})).unwrap();
        assert!(options.entity.is_none());
        assert!(!options.ignore);
    }

    #[test]
    fn entity_and_record_type_are_parsed() {
        let attrs = parse_attrs(quote! {
            #[permission(entity = "Order", record_type = "shop::Order")]
        });
        let options = parse_container_options(&attrs).unwrap();
        assert_eq!(options.entity.unwrap().value(), "Order");
        assert_eq!(options.record_type.unwrap().value(), "shop::Order");
    }

    #[test]
    fn ignore_is_parsed() {
        let options = parse_container_options(&parse_attrs(quote! { #[permission(ignore)] })).unwrap();
        assert!(options.ignore);
    }

    #[test]
    fn empty_entity_errors() {
        let err = parse_container_options(&parse_attrs(quote! { #[permission(entity = " ")] }))
            .unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn duplicate_entity_errors() {
        let attrs = parse_attrs(quote! {
            #[permission(entity = "Order")]
            #[permission(entity = "Invoice")]
        });
        let err = parse_container_options(&attrs).unwrap_err();
        assert!(err.to_string().contains("duplicate container option"));
    }

    #[test]
    fn unknown_option_errors() {
        let err = parse_container_options(&parse_attrs(quote! { #[permission(skip_debug)] }))
            .unwrap_err();
        assert!(err.to_string().contains("unknown container option"));
    }

    #[test]
    fn bare_permission_errors() {
        assert!(parse_container_options(&parse_attrs(quote! { #[permission] })).is_err());
    }
}

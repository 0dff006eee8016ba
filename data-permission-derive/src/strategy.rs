//! Parsing of `#[permission(...)]` field attributes.
//!
//! This module maps attribute syntax to per-member decisions and produces
//! structured errors for invalid forms.

use proc_macro2::Span;
use syn::{spanned::Spanned, Attribute, LitStr, Meta, Result};

/// How a member takes part in the generated declaration and field view.
///
/// | Attribute | Strategy | Behavior |
/// |-----------|----------|----------|
/// | None | `Plain` | In the field view, not permission controlled |
/// | `#[permission(field)]` | `Field(None)` | Controlled under its member name |
/// | `#[permission(field = "x")]` | `Field(Some(x))` | Controlled as permission field `x` |
/// | `#[permission(ignore)]` | `Ignore` | In the field view, never descended into or dropped |
/// | `#[permission(flatten)]` | `Flatten` | Members spliced in, declaration inherited |
#[derive(Clone, Debug)]
pub(crate) enum Strategy {
    Plain,
    Field(Option<LitStr>),
    Ignore,
    Flatten,
}

fn set_strategy(target: &mut Option<Strategy>, next: Strategy, span: Span) -> Result<()> {
    if target.is_some() {
        return Err(syn::Error::new(
            span,
            "conflicting #[permission] options on the same field; use one of \
             `field`, `ignore` or `flatten`",
        ));
    }
    *target = Some(next);
    Ok(())
}

pub(crate) fn parse_field_strategy(attrs: &[Attribute]) -> Result<Strategy> {
    let mut strategy: Option<Strategy> = None;
    for attr in attrs {
        if !attr.path().is_ident("permission") {
            continue;
        }

        let Meta::List(list) = &attr.meta else {
            return Err(syn::Error::new(
                attr.span(),
                "expected #[permission(field)], #[permission(field = \"...\")], \
                 #[permission(ignore)] or #[permission(flatten)]",
            ));
        };
        list.parse_nested_meta(|meta| {
            let span = meta.path.span();
            if meta.path.is_ident("field") {
                let name = if meta.input.peek(syn::Token![=]) {
                    let name: LitStr = meta.value()?.parse()?;
                    if name.value().trim().is_empty() {
                        return Err(syn::Error::new(
                            name.span(),
                            "permission field name must not be empty",
                        ));
                    }
                    Some(name)
                } else {
                    None
                };
                set_strategy(&mut strategy, Strategy::Field(name), span)
            } else if meta.path.is_ident("ignore") {
                set_strategy(&mut strategy, Strategy::Ignore, span)
            } else if meta.path.is_ident("flatten") {
                set_strategy(&mut strategy, Strategy::Flatten, span)
            } else {
                Err(meta.error("unknown field option; expected `field`, `ignore` or `flatten`"))
            }
        })?;
    }

    Ok(strategy.unwrap_or(Strategy::Plain))
}

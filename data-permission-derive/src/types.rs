//! Type utilities for the derive macro.

/// Checks if a type is `PhantomData<..>`, bare or path-qualified.
///
/// Matching is syntactic: a type alias of `PhantomData` is not recognized.
pub(crate) fn is_phantom_data(ty: &syn::Type) -> bool {
    let syn::Type::Path(path) = ty else {
        return false;
    };
    path.qself.is_none()
        && path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "PhantomData")
}

#[cfg(test)]
mod tests {
    use quote::quote;

    use super::*;

    fn parse_type(tokens: proc_macro2::TokenStream) -> syn::Type {
        syn::parse2(tokens).expect("should parse as Type")
    }

    #[test]
    fn bare_phantom_data_detected() {
        assert!(is_phantom_data(&parse_type(quote! { PhantomData<T> })));
    }

    #[test]
    fn qualified_phantom_data_detected() {
        assert!(is_phantom_data(&parse_type(quote! { ::core::marker::PhantomData<T> })));
    }

    #[test]
    fn other_types_are_not_phantom() {
        assert!(!is_phantom_data(&parse_type(quote! { Vec<T> })));
        assert!(!is_phantom_data(&parse_type(quote! { (T, u8) })));
    }
}

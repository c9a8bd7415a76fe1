//! Derive macros for Bramble property-based testing.
//!
//! `#[derive(Construct)]` lets a struct be built positionally by
//! `bramble::construct`, and `#[derive(Arbitrary)]` gives it a default
//! generator drawing every field from its own `Arbitrary` impl.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Data, DeriveInput, Fields, Type};

/// Largest number of fields `#[derive(Arbitrary)]` can fill with defaults.
const MAX_DEFAULT_FIELDS: usize = 4;

/// Derive `bramble::Construct<(F0, F1, ...)>` for a struct.
///
/// The parameters are the fields in declaration order.
///
/// # Example
///
/// ```rust,ignore
/// use bramble::*;
///
/// #[derive(Construct, Debug, Clone)]
/// struct User {
///     name: String,
///     age: u32,
/// }
///
/// let users = construct::<User, (String, u32), _>((Gen::<String>::ascii_alpha(8),));
/// ```
#[proc_macro_derive(Construct)]
pub fn derive_construct(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match construct_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Derive `bramble::Arbitrary` for a struct of at most four fields.
///
/// Requires `Construct` as well; every field type must be `Arbitrary`.
#[proc_macro_derive(Arbitrary)]
pub fn derive_arbitrary(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match arbitrary_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// The field types of a struct and the expression rebuilding it from
/// bindings named `field_0`, `field_1`, ...
fn struct_shape(input: &DeriveInput) -> Result<(Vec<Type>, TokenStream2), syn::Error> {
    let data = match &input.data {
        Data::Struct(data) => data,
        Data::Enum(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "Construct can only be derived for structs, not enums",
            ))
        }
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "Construct can only be derived for structs, not unions",
            ))
        }
    };

    match &data.fields {
        Fields::Named(fields) => {
            let types = fields.named.iter().map(|field| field.ty.clone()).collect();
            let assignments = fields.named.iter().enumerate().map(|(i, field)| {
                let name = &field.ident;
                let var = format_ident!("field_{}", i);
                quote! { #name: #var }
            });
            Ok((types, quote! { Self { #(#assignments),* } }))
        }
        Fields::Unnamed(fields) => {
            let types = fields.unnamed.iter().map(|field| field.ty.clone()).collect();
            let vars = (0..fields.unnamed.len()).map(|i| format_ident!("field_{}", i));
            Ok((types, quote! { Self(#(#vars),*) }))
        }
        Fields::Unit => Ok((Vec::new(), quote! { Self })),
    }
}

fn construct_impl(input: &DeriveInput) -> Result<TokenStream2, syn::Error> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let (types, build) = struct_shape(input)?;
    let vars: Vec<_> = (0..types.len()).map(|i| format_ident!("field_{}", i)).collect();

    Ok(quote! {
        impl #impl_generics bramble::Construct<(#(#types,)*)> for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn construct((#(#vars,)*): (#(#types,)*)) -> Self {
                #build
            }
        }
    })
}

fn arbitrary_impl(input: &DeriveInput) -> Result<TokenStream2, syn::Error> {
    let name = &input.ident;
    let (types, _) = struct_shape(input)?;
    if types.len() > MAX_DEFAULT_FIELDS {
        return Err(syn::Error::new_spanned(
            input,
            format!("Arbitrary can be derived for at most {MAX_DEFAULT_FIELDS} fields"),
        ));
    }

    let mut generics = input.generics.clone();
    {
        let where_clause = generics.make_where_clause();
        for ty in &types {
            where_clause
                .predicates
                .push(syn::parse_quote! { #ty: bramble::Arbitrary });
        }
        where_clause
            .predicates
            .push(syn::parse_quote! { Self: ::core::clone::Clone + 'static });
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let body = if types.is_empty() {
        quote! { bramble::Gen::constant(<Self as bramble::Construct<()>>::construct(())) }
    } else {
        quote! { bramble::construct::<Self, (#(#types,)*), _>(()) }
    };

    Ok(quote! {
        impl #impl_generics bramble::Arbitrary for #name #ty_generics #where_clause {
            fn arbitrary() -> bramble::Gen<Self> {
                #body
            }
        }
    })
}

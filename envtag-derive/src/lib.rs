//! Derive macro implementation for envtag

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Data, DeriveInput, Field, Fields, Visibility};

mod attrs;

use attrs::FieldAttrs;

/// `Env` derive macro
///
/// Implements `EnvStruct`, `EnvType` and `EnvField` for a struct with named
/// fields, plus an inherent `from_env()` constructor. The struct must
/// implement `Default`.
///
/// # Field Attributes
///
/// - `#[env("KEY,modifier,...")]`: variable name and modifiers
/// - `#[env(default = "value")]`: value used when the variable is absent or empty
/// - `#[env(prefix = "PREFIX_")]`: prefix for the keys of a nested struct
/// - `#[env(separator = ";")]`: element separator for `Vec` and map fields
/// - `#[env(key_value_separator = "=")]`: key/value separator for map fields
///
/// Any other `name = "value"` pair is kept and can be selected at runtime
/// through the tag-name options. Private fields are skipped.
///
/// # Example
///
/// See the `envtag` crate documentation for usage examples.
#[proc_macro_derive(Env, attributes(env))]
pub fn derive_env(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_env(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// `EnvText` derive macro
///
/// Makes a `FromStr` type usable as a field (and as a `Vec` element or map
/// key/value) by decoding it from text. The `FromStr::Err` type must
/// implement `Display`.
#[proc_macro_derive(EnvText)]
pub fn derive_env_text(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_env_text(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn reject_generics(input: &DeriveInput, derive: &str) -> syn::Result<()> {
    if input.generics.params.is_empty() {
        Ok(())
    } else {
        Err(syn::Error::new_spanned(
            &input.generics,
            format!("{derive} does not support generic types"),
        ))
    }
}

fn struct_fields(input: &DeriveInput) -> syn::Result<Vec<&Field>> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(fields.named.iter().collect()),
            Fields::Unit => Ok(Vec::new()),
            Fields::Unnamed(_) => Err(syn::Error::new_spanned(
                &input.ident,
                "Env only supports structs with named fields",
            )),
        },
        _ => Err(syn::Error::new_spanned(
            &input.ident,
            "Env only supports structs",
        )),
    }
}

fn visit_field(field: &Field) -> syn::Result<TokenStream2> {
    let Some(ident) = &field.ident else {
        return Err(syn::Error::new_spanned(field, "expected a named field"));
    };
    let name = ident.unraw().to_string();
    let exported = !matches!(field.vis, Visibility::Inherited);

    let attrs = FieldAttrs::from_field(field)?;
    let tags = attrs.tags.iter().map(|(tag, value)| quote! { (#tag, #value) });

    Ok(quote! {
        visitor.visit(
            &::envtag::FieldSpec {
                name: #name,
                exported: #exported,
                tags: &[#(#tags),*],
            },
            &mut self.#ident,
        );
    })
}

fn leaf_field_impl(name: &syn::Ident) -> TokenStream2 {
    quote! {
        impl ::envtag::EnvField for #name {
            fn type_name(&self) -> &'static str {
                <Self as ::envtag::EnvType>::type_name()
            }

            fn assign(
                &mut self,
                raw: &str,
                cx: &::envtag::FieldContext<'_>,
            ) -> ::core::result::Result<(), ::envtag::EnvError> {
                *self = cx.convert::<Self>(raw)?;
                ::core::result::Result::Ok(())
            }
        }
    }
}

fn expand_env(input: &DeriveInput) -> syn::Result<TokenStream2> {
    reject_generics(input, "Env")?;
    let struct_name = &input.ident;

    let visits = struct_fields(input)?
        .into_iter()
        .map(visit_field)
        .collect::<syn::Result<Vec<_>>>()?;

    Ok(quote! {
        impl ::envtag::EnvStruct for #struct_name {
            #[allow(unused_variables)]
            fn visit_fields(&mut self, visitor: &mut dyn ::envtag::FieldVisitor) {
                #(#visits)*
            }
        }

        impl ::envtag::EnvType for #struct_name {
            fn instantiate() -> ::core::option::Option<Self> {
                ::core::option::Option::Some(<Self as ::core::default::Default>::default())
            }
        }

        impl ::envtag::EnvField for #struct_name {
            fn type_name(&self) -> &'static str {
                <Self as ::envtag::EnvType>::type_name()
            }

            fn assign(
                &mut self,
                raw: &str,
                cx: &::envtag::FieldContext<'_>,
            ) -> ::core::result::Result<(), ::envtag::EnvError> {
                *self = cx.convert::<Self>(raw)?;
                ::core::result::Result::Ok(())
            }

            fn nested(&mut self) -> ::core::option::Option<&mut dyn ::envtag::EnvStruct> {
                ::core::option::Option::Some(self)
            }
        }

        impl #struct_name {
            /// Load configuration from environment variables
            ///
            /// # Errors
            ///
            /// Returns every failure of the walk: missing required variables,
            /// empty `notEmpty` values, unreadable files, and values that
            /// cannot be converted into their field types.
            pub fn from_env() -> ::core::result::Result<Self, ::envtag::AggregateError> {
                ::envtag::parse_as::<Self>()
            }
        }
    })
}

fn expand_env_text(input: &DeriveInput) -> syn::Result<TokenStream2> {
    reject_generics(input, "EnvText")?;
    let name = &input.ident;
    let field_impl = leaf_field_impl(name);

    Ok(quote! {
        impl ::envtag::EnvType for #name {
            fn text_decoder() -> ::core::option::Option<
                fn(&str) -> ::core::result::Result<Self, ::envtag::BoxError>,
            > {
                fn decode(text: &str) -> ::core::result::Result<#name, ::envtag::BoxError> {
                    <#name as ::core::str::FromStr>::from_str(text)
                        .map_err(|err| ::std::string::ToString::to_string(&err).into())
                }
                ::core::option::Option::Some(
                    decode as fn(&str) -> ::core::result::Result<Self, ::envtag::BoxError>,
                )
            }
        }

        #field_impl
    })
}

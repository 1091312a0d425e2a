//! Attribute parsing for `#[env(...)]` annotations.
//!
//! A field annotation is a comma-separated list of one optional bare string
//! literal (stored under the `key` tag) and any number of `name = "literal"`
//! pairs (stored under `name`). The runtime decides which tags it reads, so no
//! tag name is rejected here.

use syn::ext::IdentExt;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Field, Ident, Lit, LitStr, Token};

/// Tag under which the leading string literal is stored.
const KEY_TAG: &str = "key";

enum Arg {
    Key(LitStr),
    Named { name: Ident, value: LitStr },
}

impl Parse for Arg {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(LitStr) {
            return Ok(Self::Key(input.parse()?));
        }

        let name = input.call(Ident::parse_any)?;
        input.parse::<Token![=]>()?;
        match input.parse::<Lit>()? {
            Lit::Str(value) => Ok(Self::Named { name, value }),
            other => Err(syn::Error::new_spanned(
                other,
                format!("`{}` expects a string literal", name.unraw()),
            )),
        }
    }
}

/// Tags collected from every `#[env(...)]` attribute on a field, in
/// declaration order.
#[derive(Debug, Default)]
pub struct FieldAttrs {
    pub tags: Vec<(String, String)>,
}

impl FieldAttrs {
    pub fn from_field(field: &Field) -> syn::Result<Self> {
        let mut attrs = Self::default();

        for attr in &field.attrs {
            if !attr.path().is_ident("env") {
                continue;
            }

            let args = attr.parse_args_with(Punctuated::<Arg, Token![,]>::parse_terminated)?;
            for arg in args {
                let (name, value, span) = match arg {
                    Arg::Key(lit) => (KEY_TAG.to_string(), lit.value(), lit.span()),
                    Arg::Named { name, value } => {
                        (name.unraw().to_string(), value.value(), name.span())
                    }
                };

                if attrs.tag(&name).is_some() {
                    return Err(syn::Error::new(
                        span,
                        format!("duplicate `{name}` in env attribute"),
                    ));
                }
                attrs.tags.push((name, value));
            }
        }

        Ok(attrs)
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(tag, _)| tag == name)
            .map(|(_, value)| value.as_str())
    }
}

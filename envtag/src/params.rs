//! Per-field annotation parsing.

use crate::error::EnvError;
use crate::options::Options;
use crate::walk::FieldSpec;
use serde::Serialize;
use std::str::FromStr;

/// Resolved intent for one field, built fresh from its annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldParams {
    /// Key as written on the field (or synthesized from its name)
    pub own_key: String,
    /// `own_key` with the accumulated prefix
    pub key: String,
    /// Declared default; `Some("")` is an explicit empty default
    pub default_value: Option<String>,
    pub required: bool,
    pub not_empty: bool,
    pub init: bool,
    pub expand: bool,
    pub unset: bool,
    pub load_file: bool,
}

impl FieldParams {
    pub fn has_default_value(&self) -> bool {
        self.default_value.is_some()
    }
}

/// Modifier tokens accepted after the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Modifier {
    Required,
    NotEmpty,
    Init,
    Expand,
    Unset,
    File,
}

impl FromStr for Modifier {
    type Err = EnvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "required" => Ok(Self::Required),
            "notEmpty" => Ok(Self::NotEmpty),
            "init" => Ok(Self::Init),
            "expand" => Ok(Self::Expand),
            "unset" => Ok(Self::Unset),
            "file" => Ok(Self::File),
            other => Err(EnvError::UnsupportedOption {
                option: other.to_string(),
            }),
        }
    }
}

/// Split `KEY,opt1,opt2` into the key and its modifier tokens.
fn split_key_options(annotation: &str) -> (&str, std::str::Split<'_, char>) {
    let mut parts = annotation.split(',');
    let key = parts.next().unwrap_or_default();
    (key, parts)
}

pub(crate) fn parse_field_params(
    spec: &FieldSpec,
    options: &Options,
    prefix: &str,
) -> Result<FieldParams, EnvError> {
    let (own_key, modifiers) = split_key_options(spec.tag(&options.tag_name).unwrap_or_default());

    let own_key = if own_key.is_empty() && options.use_field_name_by_default {
        to_env_name(spec.name)
    } else {
        own_key.to_string()
    };

    let mut params = FieldParams {
        key: format!("{prefix}{own_key}"),
        own_key,
        default_value: spec
            .tag(&options.default_value_tag_name)
            .map(str::to_string),
        required: options.required_if_no_default,
        ..FieldParams::default()
    };

    for token in modifiers.filter(|token| !token.is_empty()) {
        match token.parse::<Modifier>()? {
            Modifier::Required => params.required = true,
            Modifier::NotEmpty => params.not_empty = true,
            Modifier::Init => params.init = true,
            Modifier::Expand => params.expand = true,
            Modifier::Unset => params.unset = true,
            Modifier::File => params.load_file = true,
        }
    }

    Ok(params)
}

/// Convert an identifier into an upper-case, underscore-separated name.
///
/// Existing underscores are kept as word separators rather than stripped,
/// so `a_B` becomes `A_B` and `database_url` stays `DATABASE_URL`. Inside a
/// word an underscore is
/// inserted before an upper-case letter whose neighbour on either side is
/// lower-case, so `DatabaseURL` becomes `DATABASE_URL` and `HTTPServer`
/// becomes `HTTP_SERVER`.
pub fn to_env_name(ident: &str) -> String {
    let ident = ident.strip_prefix("r#").unwrap_or(ident);
    let mut words = Vec::new();

    for segment in ident.split('_').filter(|s| !s.is_empty()) {
        let chars: Vec<char> = segment.chars().collect();
        let mut word = String::with_capacity(segment.len() + 2);
        for (i, &c) in chars.iter().enumerate() {
            if i > 0 && c.is_uppercase() {
                let prev_lower = chars[i - 1].is_lowercase();
                let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
                if prev_lower || next_lower {
                    word.push('_');
                }
            }
            word.extend(c.to_uppercase());
        }
        words.push(word);
    }

    words.join("_")
}

//! Value resolution: environment lookup, defaults, expansion, file loading.

use crate::convert::{EnvField, FieldContext};
use crate::error::EnvError;
use crate::expand::Expander;
use crate::options::{KEY_VALUE_SEPARATOR_TAG_NAME, SEPARATOR_TAG_NAME};
use crate::params::FieldParams;
use crate::walk::{Context, FieldSpec, ProcessField};
use std::collections::HashMap;
use std::fs;
use tracing::debug;

const DEFAULT_SEPARATOR: &str = ",";
const DEFAULT_KEY_VALUE_SEPARATOR: &str = ":";

#[derive(Debug, PartialEq, Eq)]
struct Lookup<'a> {
    value: &'a str,
    exists: bool,
    is_default: bool,
}

/// Look `key` up, falling back to `default` when the variable is missing,
/// empty, or the key itself is empty.
fn lookup<'a>(
    environment: &'a HashMap<String, String>,
    key: &str,
    default: Option<&'a str>,
) -> Lookup<'a> {
    let found = environment.get(key).map(String::as_str);
    match (found, default) {
        (Some(""), Some(default)) => Lookup {
            value: default,
            exists: true,
            is_default: true,
        },
        (_, Some(default)) if found.is_none() || key.is_empty() => Lookup {
            value: default,
            exists: true,
            is_default: true,
        },
        (None, _) => Lookup {
            value: "",
            exists: false,
            is_default: false,
        },
        (Some(value), _) => Lookup {
            value,
            exists: true,
            is_default: false,
        },
    }
}

/// Removes a variable from the process environment when dropped.
struct UnsetGuard {
    key: String,
}

impl Drop for UnsetGuard {
    fn drop(&mut self) {
        debug!(key = %self.key, "unsetting environment variable");
        std::env::remove_var(&self.key);
    }
}

/// A resolved value. An `unset` field's variable is removed from the
/// process environment when this is dropped.
pub(crate) struct Resolved {
    pub(crate) value: String,
    _unset: Option<UnsetGuard>,
}

fn load_file(filename: &str, key: &str) -> Result<String, EnvError> {
    let bytes = fs::read(filename).map_err(|source| EnvError::LoadFile {
        filename: filename.to_string(),
        key: key.to_string(),
        source,
    })?;
    debug!(key, filename, "loaded value from file");
    // Invalid UTF-8 sequences become U+FFFD
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Produce the final string for one field.
pub(crate) fn resolve(cx: &mut Context<'_>, params: &FieldParams) -> Result<Resolved, EnvError> {
    let options = cx.options;
    let found = lookup(
        &options.environment,
        &params.key,
        params.default_value.as_deref(),
    );

    let mut value = if params.expand {
        Expander::new(&cx.raw_values, &options.environment).expand(found.value)
    } else {
        found.value.to_string()
    };

    cx.raw_values.insert(params.own_key.clone(), value.clone());

    let unset = params.unset.then(|| UnsetGuard {
        key: params.key.clone(),
    });

    if params.required && !found.exists && !params.own_key.is_empty() {
        return Err(EnvError::VarNotSet {
            key: params.key.clone(),
        });
    }
    if params.not_empty && value.is_empty() {
        return Err(EnvError::EmptyVar {
            key: params.key.clone(),
        });
    }

    if params.load_file && !value.is_empty() {
        value = load_file(&value, &params.key)?;
    }

    if !params.own_key.is_empty() {
        debug!(key = %params.key, from_default = found.is_default, "resolved environment variable");
        if let Some(on_set) = &options.on_set {
            on_set(&params.key, &value, found.is_default);
        }
    }

    Ok(Resolved {
        value,
        _unset: unset,
    })
}

/// Resolves each field and converts the result into it.
///
/// An empty resolved value leaves the field untouched.
#[derive(Debug, Default)]
pub(crate) struct SetField;

impl ProcessField for SetField {
    fn process(
        &mut self,
        cx: &mut Context<'_>,
        spec: &FieldSpec,
        params: &FieldParams,
        field: &mut dyn EnvField,
    ) -> Result<(), EnvError> {
        let resolved = resolve(cx, params)?;
        if resolved.value.is_empty() {
            return Ok(());
        }

        let separator = spec
            .tag(SEPARATOR_TAG_NAME)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SEPARATOR);
        let key_value_separator = spec
            .tag(KEY_VALUE_SEPARATOR_TAG_NAME)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_KEY_VALUE_SEPARATOR);

        let field_cx = FieldContext {
            field: spec.name,
            type_name: field.type_name(),
            separator,
            key_value_separator,
            parsers: &cx.options.parsers,
        };
        field.assign(&resolved.value, &field_cx)
    }
}

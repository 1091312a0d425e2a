//! Populate configuration structs from environment variables
//!
//! `envtag` walks a struct annotated with `#[derive(Env)]`, looks each field's
//! key up in an environment snapshot, and converts the value into the field's
//! type. Every failure in the walk is collected into one [`AggregateError`]
//! instead of stopping at the first.
//!
//! # Features
//!
//! - **Declarative**: keys, defaults and modifiers live on the field
//! - **Nested structs**: prefixes accumulate through `prefix = "..."`
//! - **Expansion**: `$NAME` / `${NAME}` references resolved against the
//!   environment and earlier fields
//! - **File-based secrets**: the `file` modifier reads the named file
//! - **Extensible**: register converters per type with [`Parsers`], or derive
//!   [`EnvText`] for any `FromStr` type
//!
//! # Example
//!
//! ```rust
//! use envtag::Env;
//!
//! #[derive(Debug, Default, Env)]
//! pub struct Config {
//!     #[env("HOME")]
//!     pub home: String,
//!
//!     #[env("PORT", default = "3000")]
//!     pub port: u16,
//!
//!     #[env("IS_PRODUCTION")]
//!     pub is_production: bool,
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! #     std::env::set_var("HOME", "/tmp/fakehome");
//! #     std::env::remove_var("PORT");
//! let config = Config::from_env()?;
//! assert_eq!(config.home, "/tmp/fakehome");
//! assert_eq!(config.port, 3000);
//! #     Ok(())
//! # }
//! ```
//!
//! # Annotations
//!
//! ## `#[env("KEY,modifier,...")]`
//!
//! The leading string names the variable. Modifiers follow, separated by
//! commas:
//!
//! | Modifier   | Effect                                                     |
//! |------------|------------------------------------------------------------|
//! | `required` | fail when the variable is absent and there is no default   |
//! | `notEmpty` | fail when the resolved value is empty                      |
//! | `expand`   | substitute `$NAME` / `${NAME}` references                  |
//! | `file`     | treat the value as a path and read the file's contents     |
//! | `unset`    | remove the variable from the process environment afterwards |
//! | `init`     | allocate an `Option` struct field that is still `None`     |
//!
//! ## `default = "..."`
//!
//! Used when the variable is absent or empty. `default = ""` is a declared
//! empty default, distinct from no default.
//!
//! ```rust
//! # use envtag::Env;
//! #[derive(Default, Env)]
//! pub struct Config {
//!     #[env("LOG_LEVEL", default = "info")]
//!     pub log_level: String,
//! }
//! ```
//!
//! ## `prefix = "..."`
//!
//! On a nested struct field, prepended to every key inside it:
//!
//! ```rust
//! # use envtag::Env;
//! #[derive(Default, Env)]
//! pub struct Database {
//!     #[env("HOST", default = "localhost")]
//!     pub host: String,
//! }
//!
//! #[derive(Default, Env)]
//! pub struct Config {
//!     // reads DB_HOST
//!     #[env(prefix = "DB_")]
//!     pub database: Database,
//! }
//! ```
//!
//! ## `separator = "..."`, `key_value_separator = "..."`
//!
//! Element separator for `Vec` and map fields (default `,`) and the key/value
//! separator for map fields (default `:`).
//!
//! Elements of a `Vec` are always present, so `Vec<Option<T>>` is not a field
//! type:
//!
//! ```compile_fail
//! # use envtag::Env;
//! #[derive(Default, Env)]
//! pub struct Config {
//!     #[env("PORTS")]
//!     pub ports: Vec<Option<u16>>,
//! }
//! ```
//!
//! ## `file`
//!
//! The file is read as bytes and used verbatim; invalid UTF-8 sequences are
//! replaced with U+FFFD.
//!
//! # Errors
//!
//! ```rust
//! # use envtag::{Env, ErrorKind, Options};
//! # use std::collections::HashMap;
//! #[derive(Debug, Default, Env)]
//! pub struct Config {
//!     #[env("NAME,required")]
//!     pub name: String,
//!     #[env("AGE")]
//!     pub age: u8,
//! }
//!
//! let options = Options::default()
//!     .environment(HashMap::from([("AGE".to_string(), "old".to_string())]));
//! let err = envtag::parse_as_with_options::<Config>(&options).unwrap_err();
//! assert_eq!(err.len(), 2);
//! assert!(err.is(ErrorKind::VarNotSet));
//! assert!(err.is(ErrorKind::Parse));
//! ```

mod convert;
mod error;
mod expand;
mod options;
mod params;
mod parsers;
mod resolve;
mod walk;

pub use convert::{EnvField, EnvType, FieldContext};
pub use envtag_derive::{Env, EnvText};
pub use error::{AggregateError, BoxError, EnvError, ErrorKind};
pub use options::{OnSet, Options};
pub use params::{to_env_name, FieldParams};
pub use parsers::{Kind, Parsers};
pub use walk::{EnvStruct, FieldSpec, FieldVisitor};

use resolve::SetField;
use walk::{CollectParams, Walker};

/// Populate `target` from the process environment.
///
/// `target` must be a struct (or an `Option` holding one); anything else
/// fails with [`ErrorKind::NotStruct`].
pub fn parse<T: EnvField + ?Sized>(target: &mut T) -> Result<(), AggregateError> {
    parse_with_options(target, &Options::default())
}

pub fn parse_with_options<T: EnvField + ?Sized>(
    target: &mut T,
    options: &Options,
) -> Result<(), AggregateError> {
    let Some(target) = target.nested() else {
        return Err(AggregateError::single(EnvError::NotStruct));
    };
    Walker::new(options, SetField).run(target).map(|_| ())
}

/// Build a `T` from its default value and populate it.
pub fn parse_as<T: EnvStruct + Default>() -> Result<T, AggregateError> {
    parse_as_with_options(&Options::default())
}

pub fn parse_as_with_options<T: EnvStruct + Default>(
    options: &Options,
) -> Result<T, AggregateError> {
    let mut target = T::default();
    Walker::new(options, SetField).run(&mut target)?;
    Ok(target)
}

/// Describe every keyed field of `T` without reading any value.
///
/// Optional nested structs are only described when they carry `init`.
pub fn field_params<T: EnvStruct + Default>() -> Result<Vec<FieldParams>, AggregateError> {
    field_params_with_options::<T>(&Options::default())
}

pub fn field_params_with_options<T: EnvStruct + Default>(
    options: &Options,
) -> Result<Vec<FieldParams>, AggregateError> {
    let mut target = T::default();
    Walker::new(options, CollectParams::default())
        .run(&mut target)
        .map(|collected| collected.params)
}

//! Leaf converters: string to typed value for one target type.

use crate::convert::EnvType;
use crate::error::BoxError;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

type ErasedParser = Arc<dyn Fn(&str) -> Result<Box<dyn Any>, BoxError> + Send + Sync>;

/// Built-in scalar categories converted without any registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    String,
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
}

impl Kind {
    fn parse(self, text: &str) -> Result<Box<dyn Any>, BoxError> {
        fn boxed<T: Any>(value: T) -> Box<dyn Any> {
            Box::new(value)
        }

        Ok(match self {
            Self::Bool => boxed(parse_bool(text)?),
            Self::String => boxed(text.to_string()),
            Self::I8 => boxed(text.parse::<i8>()?),
            Self::I16 => boxed(text.parse::<i16>()?),
            Self::I32 => boxed(text.parse::<i32>()?),
            Self::I64 => boxed(text.parse::<i64>()?),
            Self::I128 => boxed(text.parse::<i128>()?),
            Self::Isize => boxed(text.parse::<isize>()?),
            Self::U8 => boxed(text.parse::<u8>()?),
            Self::U16 => boxed(text.parse::<u16>()?),
            Self::U32 => boxed(text.parse::<u32>()?),
            Self::U64 => boxed(text.parse::<u64>()?),
            Self::U128 => boxed(text.parse::<u128>()?),
            Self::Usize => boxed(text.parse::<usize>()?),
            Self::F32 => boxed(text.parse::<f32>()?),
            Self::F64 => boxed(text.parse::<f64>()?),
        })
    }
}

fn parse_bool(text: &str) -> Result<bool, BoxError> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(format!("invalid boolean {text:?}").into()),
    }
}

/// Registry of leaf converters keyed by [`EnvType::type_name`].
///
/// Lookup checks the override table first and falls back to the built-in
/// [`Kind`] table. The default registry carries converters for
/// [`url::Url`], [`std::time::Duration`] and [`chrono_tz::Tz`]; each can be
/// replaced with [`Parsers::insert`].
#[derive(Clone)]
pub struct Parsers {
    by_type: HashMap<&'static str, ErasedParser>,
}

impl Parsers {
    /// Registry without any override, only the built-in scalar kinds
    pub fn empty() -> Self {
        Self {
            by_type: HashMap::new(),
        }
    }

    /// Register (or replace) the converter for `T`
    pub fn insert<T, F>(&mut self, parser: F) -> &mut Self
    where
        T: EnvType,
        F: Fn(&str) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let erased: ErasedParser =
            Arc::new(move |text: &str| parser(text).map(|value| Box::new(value) as Box<dyn Any>));
        self.by_type.insert(T::type_name(), erased);
        self
    }

    /// Drop the override for `T`, returning whether one was registered
    pub fn remove<T: EnvType>(&mut self) -> bool {
        self.by_type.remove(T::type_name()).is_some()
    }

    pub fn contains<T: EnvType>(&self) -> bool {
        self.by_type.contains_key(T::type_name()) || T::kind().is_some()
    }

    pub(crate) fn merge(&mut self, other: &Parsers) {
        for (name, parser) in &other.by_type {
            self.by_type.insert(*name, Arc::clone(parser));
        }
    }

    /// Converter for `T`, if one is registered or `T` has a built-in kind.
    pub(crate) fn lookup<T: EnvType>(&self) -> Option<impl Fn(&str) -> Result<T, BoxError> + '_> {
        let parse: Box<dyn Fn(&str) -> Result<Box<dyn Any>, BoxError> + '_> =
            match self.by_type.get(T::type_name()) {
                Some(parser) => Box::new(move |text: &str| parser(text)),
                None => {
                    let kind = T::kind()?;
                    Box::new(move |text: &str| kind.parse(text))
                }
            };

        Some(move |text: &str| -> Result<T, BoxError> {
            let value = parse(text)?;
            value.downcast::<T>().map(|v| *v).map_err(|_| {
                format!("converter produced a value that is not a {}", T::type_name()).into()
            })
        })
    }
}

impl Default for Parsers {
    fn default() -> Self {
        let mut parsers = Self::empty();
        parsers
            .insert::<url::Url, _>(parse_url)
            .insert::<Duration, _>(parse_duration)
            .insert::<chrono_tz::Tz, _>(parse_location);
        parsers
    }
}

impl fmt::Debug for Parsers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.by_type.keys().collect();
        names.sort();
        f.debug_struct("Parsers").field("by_type", &names).finish()
    }
}

fn parse_url(text: &str) -> Result<url::Url, BoxError> {
    url::Url::parse(text).map_err(|e| format!("unable to parse URL: {e}").into())
}

fn parse_duration(text: &str) -> Result<Duration, BoxError> {
    humantime::parse_duration(text).map_err(|e| format!("unable to parse duration: {e}").into())
}

fn parse_location(text: &str) -> Result<chrono_tz::Tz, BoxError> {
    text.parse::<chrono_tz::Tz>()
        .map_err(|e| format!("unable to parse location: {e}").into())
}

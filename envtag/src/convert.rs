//! Type-directed conversion of a resolved string into a field value.
//!
//! Two capabilities drive conversion:
//!
//! - [`EnvType`] describes one element type: its registry key, an optional
//!   built-in [`Kind`], an optional text decoder, and an optional zero value.
//! - [`EnvField`] is what the walker calls for a whole field. It is
//!   implemented for every `EnvType` leaf and for the container shapes
//!   `Option<T>`, `Vec<T>`, `HashMap<K, V>` and `BTreeMap<K, V>`.
//!
//! A text decoder always wins over the registry, so a type that decodes itself
//! is never affected by converters registered for the same name.

use crate::error::{BoxError, EnvError};
use crate::parsers::{Kind, Parsers};
use crate::walk::EnvStruct;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::time::Duration;

/// Element-level conversion capability.
///
/// Implemented for the built-in scalars, [`url::Url`], [`Duration`],
/// [`chrono_tz::Tz`], and generated by `#[derive(Env)]` and
/// `#[derive(EnvText)]`.
pub trait EnvType: Sized + 'static {
    /// Stable key used by the converter registry
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Built-in scalar category, if any
    fn kind() -> Option<Kind> {
        None
    }

    /// Self-decoding from text; takes precedence over the registry
    fn text_decoder() -> Option<fn(&str) -> Result<Self, BoxError>> {
        None
    }

    /// Zero value allocated by the `init` modifier
    fn instantiate() -> Option<Self> {
        None
    }
}

/// Per-field information handed to [`EnvField::assign`].
#[derive(Debug)]
pub struct FieldContext<'a> {
    pub(crate) field: &'a str,
    pub(crate) type_name: &'static str,
    pub(crate) separator: &'a str,
    pub(crate) key_value_separator: &'a str,
    pub(crate) parsers: &'a Parsers,
}

impl FieldContext<'_> {
    /// Rust name of the field being assigned
    pub fn field(&self) -> &str {
        self.field
    }

    pub fn parse_error(&self, source: BoxError) -> EnvError {
        EnvError::parse(self.field, self.type_name, source)
    }

    pub fn no_parser(&self) -> EnvError {
        EnvError::no_parser(self.field, self.type_name)
    }

    /// Convert `raw` into one `T` with its text decoder or registered converter
    pub fn convert<T: EnvType>(&self, raw: &str) -> Result<T, EnvError> {
        convert_leaf(raw, self)
    }
}

/// Field-level capability driven by the struct walker.
pub trait EnvField {
    /// Type name reported in conversion failures
    fn type_name(&self) -> &'static str;

    /// Convert `raw` and store it in the field
    fn assign(&mut self, raw: &str, cx: &FieldContext<'_>) -> Result<(), EnvError>;

    /// Allocate an unset optional value in place
    fn init(&mut self) {}

    /// Struct to recurse into, if the field holds one
    fn nested(&mut self) -> Option<&mut dyn EnvStruct> {
        None
    }
}

type Converter<'p, T> = Box<dyn Fn(&str) -> Result<T, BoxError> + 'p>;

fn converter<T: EnvType>(parsers: &Parsers) -> Option<Converter<'_, T>> {
    if let Some(decode) = T::text_decoder() {
        return Some(Box::new(decode) as Converter<'_, T>);
    }
    parsers
        .lookup::<T>()
        .map(|parse| Box::new(parse) as Converter<'_, T>)
}

fn convert_leaf<T: EnvType>(raw: &str, cx: &FieldContext<'_>) -> Result<T, EnvError> {
    let convert = converter::<T>(cx.parsers).ok_or_else(|| cx.no_parser())?;
    convert(raw).map_err(|e| cx.parse_error(e))
}

macro_rules! leaf_field {
    ($($ty:ty),* $(,)?) => {$(
        impl EnvField for $ty {
            fn type_name(&self) -> &'static str {
                <$ty as EnvType>::type_name()
            }

            fn assign(&mut self, raw: &str, cx: &FieldContext<'_>) -> Result<(), EnvError> {
                *self = convert_leaf::<$ty>(raw, cx)?;
                Ok(())
            }
        }
    )*};
}

macro_rules! scalar {
    ($($ty:ty => $kind:ident),* $(,)?) => {$(
        impl EnvType for $ty {
            fn kind() -> Option<Kind> {
                Some(Kind::$kind)
            }

            fn instantiate() -> Option<Self> {
                Some(<$ty>::default())
            }
        }

        leaf_field!($ty);
    )*};
}

scalar! {
    bool => Bool,
    String => String,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    usize => Usize,
    f32 => F32,
    f64 => F64,
}

impl EnvType for Duration {
    fn instantiate() -> Option<Self> {
        Some(Duration::ZERO)
    }
}

impl EnvType for url::Url {}

impl EnvType for chrono_tz::Tz {}

leaf_field!(Duration, url::Url, chrono_tz::Tz);

impl<T> EnvField for Option<T>
where
    T: EnvType + EnvField,
{
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn assign(&mut self, raw: &str, cx: &FieldContext<'_>) -> Result<(), EnvError> {
        *self = Some(convert_leaf::<T>(raw, cx)?);
        Ok(())
    }

    fn init(&mut self) {
        if self.is_none() {
            *self = T::instantiate();
        }
    }

    fn nested(&mut self) -> Option<&mut dyn EnvStruct> {
        self.as_mut().and_then(|value| value.nested())
    }
}

impl<T: EnvType> EnvField for Vec<T> {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn assign(&mut self, raw: &str, cx: &FieldContext<'_>) -> Result<(), EnvError> {
        let convert = converter::<T>(cx.parsers).ok_or_else(|| cx.no_parser())?;
        *self = raw
            .split(cx.separator)
            .map(|part| convert(part).map_err(|e| cx.parse_error(e)))
            .collect::<Result<_, _>>()?;
        Ok(())
    }
}

fn entries<K, V>(raw: &str, cx: &FieldContext<'_>) -> Result<Vec<(K, V)>, EnvError>
where
    K: EnvType,
    V: EnvType,
{
    let convert_key = converter::<K>(cx.parsers).ok_or_else(|| cx.no_parser())?;
    let convert_value = converter::<V>(cx.parsers).ok_or_else(|| cx.no_parser())?;

    raw.split(cx.separator)
        .map(|entry| {
            let pair: Vec<&str> = entry.split(cx.key_value_separator).collect();
            let &[key, value] = pair.as_slice() else {
                return Err(cx.parse_error(
                    format!(
                        "{entry:?} should be in \"key{}value\" format",
                        cx.key_value_separator
                    )
                    .into(),
                ));
            };
            let key = convert_key(key).map_err(|e| cx.parse_error(e))?;
            let value = convert_value(value).map_err(|e| cx.parse_error(e))?;
            Ok((key, value))
        })
        .collect()
}

impl<K, V> EnvField for HashMap<K, V>
where
    K: EnvType + Eq + Hash,
    V: EnvType,
{
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn assign(&mut self, raw: &str, cx: &FieldContext<'_>) -> Result<(), EnvError> {
        *self = entries::<K, V>(raw, cx)?.into_iter().collect();
        Ok(())
    }
}

impl<K, V> EnvField for BTreeMap<K, V>
where
    K: EnvType + Ord,
    V: EnvType,
{
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn assign(&mut self, raw: &str, cx: &FieldContext<'_>) -> Result<(), EnvError> {
        *self = entries::<K, V>(raw, cx)?.into_iter().collect();
        Ok(())
    }
}

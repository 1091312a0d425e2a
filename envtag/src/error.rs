//! Error types for environment variable configuration

use std::fmt;

/// Boxed error returned by leaf converters and text decoders.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A single failure recorded while walking a configuration struct.
///
/// Every variant maps to one [`ErrorKind`]; callers that only care about the
/// category should match on [`EnvError::kind`] or use [`AggregateError::is`].
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    /// The top-level target was not a struct.
    #[error("expected a mutable reference to a struct")]
    NotStruct,

    /// A field annotation carries a modifier this crate does not know.
    #[error("tag option {option:?} not supported")]
    UnsupportedOption {
        /// The offending token, exactly as written
        option: String,
    },

    /// A `required` field has no value in the environment and no default.
    #[error("required environment variable {key:?} is not set")]
    VarNotSet {
        /// Fully prefixed environment variable name
        key: String,
    },

    /// A `notEmpty` field resolved to the empty string.
    #[error("environment variable {key:?} should not be empty")]
    EmptyVar {
        /// Fully prefixed environment variable name
        key: String,
    },

    /// A `file` field points at a file that could not be read.
    #[error("could not load content of file {filename:?} from variable {key}: {source}")]
    LoadFile {
        /// Path taken from the resolved value
        filename: String,
        /// Fully prefixed environment variable name
        key: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The converter for the field rejected the value.
    #[error("parse error on field {field:?} of type {type_name:?}: {source}")]
    Parse {
        /// Rust field name
        field: String,
        /// Type name of the field
        type_name: String,
        /// Error reported by the converter
        source: BoxError,
    },

    /// Neither a text decoder nor a registered converter exists for the field's type.
    #[error("no parser found for field {field:?} of type {type_name:?}")]
    NoParser {
        /// Rust field name
        field: String,
        /// Type name of the field
        type_name: String,
    },
}

/// Failure category, used for membership checks on an [`AggregateError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotStruct,
    UnsupportedOption,
    VarNotSet,
    EmptyVar,
    LoadFile,
    Parse,
    NoParser,
}

impl EnvError {
    /// Category of this failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotStruct => ErrorKind::NotStruct,
            Self::UnsupportedOption { .. } => ErrorKind::UnsupportedOption,
            Self::VarNotSet { .. } => ErrorKind::VarNotSet,
            Self::EmptyVar { .. } => ErrorKind::EmptyVar,
            Self::LoadFile { .. } => ErrorKind::LoadFile,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::NoParser { .. } => ErrorKind::NoParser,
        }
    }

    pub(crate) fn parse(field: &str, type_name: &str, source: BoxError) -> Self {
        Self::Parse {
            field: field.to_string(),
            type_name: type_name.to_string(),
            source,
        }
    }

    pub(crate) fn no_parser(field: &str, type_name: &str) -> Self {
        Self::NoParser {
            field: field.to_string(),
            type_name: type_name.to_string(),
        }
    }
}

/// Every failure collected during one top-level parse.
///
/// An aggregate is never empty: a walk without failures returns `Ok`.
#[derive(Debug)]
pub struct AggregateError {
    errors: Vec<EnvError>,
}

impl AggregateError {
    pub(crate) fn new(errors: Vec<EnvError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    pub(crate) fn single(error: EnvError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    /// Whether a failure of the given kind occurred anywhere in the walk
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.errors.iter().any(|e| e.kind() == kind)
    }

    /// Failures in field declaration order, nested structs included
    pub fn errors(&self) -> &[EnvError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always `false`; present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<EnvError> {
        self.errors
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("env:")?;
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, " {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}

impl IntoIterator for AggregateError {
    type Item = EnvError;
    type IntoIter = std::vec::IntoIter<EnvError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a AggregateError {
    type Item = &'a EnvError;
    type IntoIter = std::slice::Iter<'a, EnvError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

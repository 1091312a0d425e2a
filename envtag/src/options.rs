//! Invocation options.

use crate::convert::EnvType;
use crate::error::BoxError;
use crate::parsers::Parsers;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Callback invoked once per resolved field with `(key, value, is_default)`.
pub type OnSet = Arc<dyn Fn(&str, &str, bool) + Send + Sync>;

/// Tag holding `KEY,modifier,...`
pub const DEFAULT_TAG_NAME: &str = "key";
/// Tag holding the literal default value
pub const DEFAULT_VALUE_TAG_NAME: &str = "default";
/// Tag holding the prefix applied to a nested struct's keys
pub const DEFAULT_PREFIX_TAG_NAME: &str = "prefix";
/// Tag overriding the element separator of sequences and mappings
pub const SEPARATOR_TAG_NAME: &str = "separator";
/// Tag overriding the key/value separator of mappings
pub const KEY_VALUE_SEPARATOR_TAG_NAME: &str = "key_value_separator";

/// Configuration for one parse.
///
/// `Options::default()` snapshots the process environment at construction
/// time; later changes to the real environment are not observed. Builder
/// methods override individual settings:
///
/// ```rust
/// use envtag::Options;
/// use std::collections::HashMap;
///
/// let options = Options::default()
///     .environment(HashMap::from([("APP_PORT".to_string(), "8080".to_string())]))
///     .prefix("APP_")
///     .use_field_name_by_default(true);
/// # let _ = options;
/// ```
#[derive(Clone)]
pub struct Options {
    pub(crate) environment: HashMap<String, String>,
    pub(crate) tag_name: String,
    pub(crate) default_value_tag_name: String,
    pub(crate) prefix_tag_name: String,
    pub(crate) prefix: String,
    pub(crate) parsers: Parsers,
    pub(crate) use_field_name_by_default: bool,
    pub(crate) required_if_no_default: bool,
    pub(crate) on_set: Option<OnSet>,
}

impl Options {
    /// Replace the environment snapshot
    pub fn environment(mut self, environment: HashMap<String, String>) -> Self {
        self.environment = environment;
        self
    }

    pub fn tag_name(mut self, name: impl Into<String>) -> Self {
        self.tag_name = name.into();
        self
    }

    pub fn default_value_tag_name(mut self, name: impl Into<String>) -> Self {
        self.default_value_tag_name = name.into();
        self
    }

    pub fn prefix_tag_name(mut self, name: impl Into<String>) -> Self {
        self.prefix_tag_name = name.into();
        self
    }

    /// Prefix prepended to every key of the top-level struct
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Register a converter for `T`, replacing any existing one
    pub fn parser<T, F>(mut self, parser: F) -> Self
    where
        T: EnvType,
        F: Fn(&str) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.parsers.insert::<T, F>(parser);
        self
    }

    /// Merge `parsers` over the current registry
    pub fn parsers(mut self, parsers: Parsers) -> Self {
        self.parsers.merge(&parsers);
        self
    }

    /// Replace the registry entirely, dropping the default converters
    pub fn with_parsers(mut self, parsers: Parsers) -> Self {
        self.parsers = parsers;
        self
    }

    /// Derive a missing key from the field name (`database_url` -> `DATABASE_URL`)
    pub fn use_field_name_by_default(mut self, enabled: bool) -> Self {
        self.use_field_name_by_default = enabled;
        self
    }

    /// Treat every field without a default as `required`
    pub fn required_if_no_default(mut self, enabled: bool) -> Self {
        self.required_if_no_default = enabled;
        self
    }

    /// Observe every resolved value
    pub fn on_set<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str, &str, bool) + Send + Sync + 'static,
    {
        self.on_set = Some(Arc::new(callback));
        self
    }

    pub fn get_environment(&self) -> &HashMap<String, String> {
        &self.environment
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            environment: snapshot(),
            tag_name: DEFAULT_TAG_NAME.to_string(),
            default_value_tag_name: DEFAULT_VALUE_TAG_NAME.to_string(),
            prefix_tag_name: DEFAULT_PREFIX_TAG_NAME.to_string(),
            prefix: String::new(),
            parsers: Parsers::default(),
            use_field_name_by_default: false,
            required_if_no_default: false,
            on_set: None,
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("environment", &self.environment.len())
            .field("tag_name", &self.tag_name)
            .field("default_value_tag_name", &self.default_value_tag_name)
            .field("prefix_tag_name", &self.prefix_tag_name)
            .field("prefix", &self.prefix)
            .field("parsers", &self.parsers)
            .field("use_field_name_by_default", &self.use_field_name_by_default)
            .field("required_if_no_default", &self.required_if_no_default)
            .field("on_set", &self.on_set.is_some())
            .finish()
    }
}

/// Current process environment; entries that are not valid UTF-8 are skipped.
fn snapshot() -> HashMap<String, String> {
    std::env::vars_os()
        .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::time::Duration;

    #[test]
    #[serial]
    fn test_default_snapshots_environment() {
        env::set_var("ENVTAG_SNAPSHOT_TEST", "before");
        let options = Options::default();
        env::set_var("ENVTAG_SNAPSHOT_TEST", "after");

        assert_eq!(
            options.get_environment().get("ENVTAG_SNAPSHOT_TEST").map(String::as_str),
            Some("before")
        );
        env::remove_var("ENVTAG_SNAPSHOT_TEST");
    }

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert_eq!(options.tag_name, "key");
        assert_eq!(options.default_value_tag_name, "default");
        assert_eq!(options.prefix_tag_name, "prefix");
        assert!(options.prefix.is_empty());
        assert!(!options.use_field_name_by_default);
        assert!(!options.required_if_no_default);
        assert!(options.on_set.is_none());
        assert!(options.parsers.contains::<Duration>());
    }

    #[test]
    fn test_parser_override_keeps_other_defaults() {
        let options = Options::default().parser::<Duration, _>(|_| Ok(Duration::from_secs(1)));
        assert!(options.parsers.contains::<Duration>());
        assert!(options.parsers.contains::<url::Url>());

        let options = Options::default().with_parsers(Parsers::empty());
        assert!(!options.parsers.contains::<url::Url>());
    }
}

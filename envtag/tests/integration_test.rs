//! Integration tests

use envtag::{Env, EnvText, ErrorKind, Options, Parsers};
use serial_test::serial;
use std::collections::{BTreeMap, HashMap};
use std::env;
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::NamedTempFile;

fn options(pairs: &[(&str, &str)]) -> Options {
    Options::default().environment(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

#[derive(Debug, Default, PartialEq, Env)]
struct Empty {}

#[derive(Debug, Default, Env)]
struct Scalars {
    #[env("BOOL")]
    pub boolean: bool,
    #[env("STRING")]
    pub string: String,
    #[env("I8")]
    pub i8: i8,
    #[env("I16")]
    pub i16: i16,
    #[env("I32")]
    pub i32: i32,
    #[env("I64")]
    pub i64: i64,
    #[env("ISIZE")]
    pub isize: isize,
    #[env("U8")]
    pub u8: u8,
    #[env("U16")]
    pub u16: u16,
    #[env("U32")]
    pub u32: u32,
    #[env("U64")]
    pub u64: u64,
    #[env("USIZE")]
    pub usize: usize,
    #[env("F32")]
    pub f32: f32,
    #[env("F64")]
    pub f64: f64,
}

#[derive(Debug, Default, Env)]
struct Collections {
    #[env("LIST")]
    pub list: Vec<String>,
    #[env("PORTS", separator = ":")]
    pub ports: Vec<u16>,
    #[env("LABELS")]
    pub labels: HashMap<String, i32>,
    #[env("WEIGHTS", separator = ";", key_value_separator = "=")]
    pub weights: BTreeMap<String, f64>,
}

#[derive(Debug, Default, Env)]
struct RequiredConfig {
    #[env("NAME,required")]
    pub name: String,
    #[env("NICK,notEmpty")]
    pub nick: String,
}

#[derive(Debug, Default, Env)]
struct Leaf {
    #[env("PORT")]
    pub port: u16,
    #[env("HOST,required")]
    pub host: String,
}

#[derive(Debug, Default, Env)]
struct Middle {
    #[env("ENABLED")]
    pub enabled: bool,
    #[env(prefix = "LEAF_")]
    pub leaf: Leaf,
}

#[derive(Debug, Default, Env)]
struct Root {
    #[env("NAME,required")]
    pub name: String,
    #[env(prefix = "MID_")]
    pub middle: Middle,
    #[env("TIMEOUT", default = "5s")]
    pub timeout: Duration,
}

#[test]
fn test_zero_field_struct() {
    let mut config = Empty {};
    envtag::parse_with_options(&mut config, &options(&[("ANY", "value")])).unwrap();
    assert_eq!(config, Empty {});
}

#[test]
fn test_scalar_kinds() {
    let opts = options(&[
        ("BOOL", "true"),
        ("STRING", "hello"),
        ("I8", "-8"),
        ("I16", "-1600"),
        ("I32", "-320000"),
        ("I64", "-6400000000"),
        ("ISIZE", "-7"),
        ("U8", "255"),
        ("U16", "1600"),
        ("U32", "320000"),
        ("U64", "6400000000"),
        ("USIZE", "7"),
        ("F32", "3.5"),
        ("F64", "-2.25"),
    ]);

    let config: Scalars = envtag::parse_as_with_options(&opts).unwrap();
    assert!(config.boolean);
    assert_eq!(config.string, "hello");
    assert_eq!(config.i8, -8);
    assert_eq!(config.i16, -1600);
    assert_eq!(config.i32, -320_000);
    assert_eq!(config.i64, -6_400_000_000);
    assert_eq!(config.isize, -7);
    assert_eq!(config.u8, 255);
    assert_eq!(config.u16, 1600);
    assert_eq!(config.u32, 320_000);
    assert_eq!(config.u64, 6_400_000_000);
    assert_eq!(config.usize, 7);
    assert_eq!(config.f32, 3.5);
    assert_eq!(config.f64, -2.25);
}

#[test]
fn test_integer_width_is_enforced() {
    let err = envtag::parse_as_with_options::<Scalars>(&options(&[("I8", "200"), ("U8", "-1")]))
        .unwrap_err();
    assert_eq!(err.len(), 2);
    assert!(err.errors().iter().all(|e| e.kind() == ErrorKind::Parse));
    assert!(err.to_string().contains(r#"parse error on field "i8" of type "i8""#));
}

#[test]
fn test_collections() {
    let opts = options(&[
        ("LIST", "a,b,c"),
        ("PORTS", "80:443"),
        ("LABELS", "x:1,y:2"),
        ("WEIGHTS", "a=0.5;b=1.5"),
    ]);

    let config: Collections = envtag::parse_as_with_options(&opts).unwrap();
    assert_eq!(config.list, vec!["a", "b", "c"]);
    assert_eq!(config.ports, vec![80, 443]);
    assert_eq!(config.labels, HashMap::from([("x".to_string(), 1), ("y".to_string(), 2)]));
    assert_eq!(
        config.weights,
        BTreeMap::from([("a".to_string(), 0.5), ("b".to_string(), 1.5)])
    );
}

#[test]
fn test_malformed_map_never_partial() {
    let err = envtag::parse_as_with_options::<Collections>(&options(&[("LABELS", "x:1,y")]))
        .unwrap_err();
    assert_eq!(err.len(), 1);
    assert!(err.is(ErrorKind::Parse));
    assert!(err.to_string().contains(r#""y" should be in "key:value" format"#));
}

#[test]
fn test_required_missing_names_key() {
    let err = envtag::parse_as_with_options::<RequiredConfig>(&options(&[("NICK", "n")]))
        .unwrap_err();
    assert_eq!(err.len(), 1);
    assert!(err.is(ErrorKind::VarNotSet));
    assert_eq!(
        err.to_string(),
        r#"env: required environment variable "NAME" is not set"#
    );
}

#[test]
fn test_not_empty_fails_on_absent_key() {
    let err = envtag::parse_as_with_options::<RequiredConfig>(&options(&[])).unwrap_err();
    assert_eq!(err.len(), 2);
    assert!(err.is(ErrorKind::VarNotSet));
    assert!(err.is(ErrorKind::EmptyVar));
    assert_eq!(err.errors()[0].kind(), ErrorKind::VarNotSet);
    assert_eq!(
        err.errors()[0].to_string(),
        r#"required environment variable "NAME" is not set"#
    );
    assert_eq!(err.errors()[1].kind(), ErrorKind::EmptyVar);
}

#[test]
fn test_required_empty_is_set_but_not_empty_fails() {
    let config: RequiredConfig =
        envtag::parse_as_with_options(&options(&[("NAME", ""), ("NICK", "n")])).unwrap();
    assert_eq!(config.name, "");
    assert_eq!(config.nick, "n");

    let err = envtag::parse_as_with_options::<RequiredConfig>(&options(&[
        ("NAME", "bob"),
        ("NICK", ""),
    ]))
    .unwrap_err();
    assert_eq!(err.len(), 1);
    assert!(err.is(ErrorKind::EmptyVar));
    assert!(!err.is(ErrorKind::VarNotSet));
}

#[test]
fn test_nested_failures_are_flattened_in_order() {
    let opts = options(&[("MID_ENABLED", "maybe"), ("MID_LEAF_PORT", "http")]);
    let err = envtag::parse_as_with_options::<Root>(&opts).unwrap_err();

    let kinds: Vec<_> = err.errors().iter().map(|e| e.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            ErrorKind::VarNotSet,
            ErrorKind::Parse,
            ErrorKind::Parse,
            ErrorKind::VarNotSet,
        ]
    );
    assert!(err
        .to_string()
        .ends_with(r#"required environment variable "MID_LEAF_HOST" is not set"#));
}

#[test]
fn test_three_failures_across_two_levels() {
    let opts = options(&[("MID_LEAF_HOST", "db"), ("MID_LEAF_PORT", "99999"), ("MID_ENABLED", "x")]);
    let err = envtag::parse_as_with_options::<Root>(&opts).unwrap_err();
    assert_eq!(err.len(), 3);
    assert_eq!(err.errors()[0].kind(), ErrorKind::VarNotSet);
    assert_eq!(err.errors()[1].kind(), ErrorKind::Parse);
    assert_eq!(err.errors()[2].kind(), ErrorKind::Parse);
}

#[test]
fn test_nested_success_and_prefixes() {
    let opts = options(&[
        ("NAME", "svc"),
        ("MID_ENABLED", "1"),
        ("MID_LEAF_HOST", "db.local"),
        ("MID_LEAF_PORT", "5432"),
    ]);
    let config: Root = envtag::parse_as_with_options(&opts).unwrap();
    assert!(config.middle.enabled);
    assert_eq!(config.middle.leaf.host, "db.local");
    assert_eq!(config.middle.leaf.port, 5432);
    assert_eq!(config.timeout, Duration::from_secs(5));

    let prefixed: Root = envtag::parse_as_with_options(
        &options(&[("APP_NAME", "svc"), ("APP_MID_LEAF_HOST", "h")]).prefix("APP_"),
    )
    .unwrap();
    assert_eq!(prefixed.name, "svc");
    assert_eq!(prefixed.middle.leaf.host, "h");
}

#[derive(Debug, Default, Env)]
struct Expanding {
    #[env("HOST", default = "localhost")]
    pub host: String,
    #[env("URL,expand")]
    pub url: String,
    #[env("MISSING_REF,expand", default = "[${NOPE}]")]
    pub missing_ref: String,
}

#[test]
fn test_expand_prefers_resolved_values() {
    let opts = options(&[("URL", "http://${HOST}:$PORT/"), ("PORT", "8080")]);
    let config: Expanding = envtag::parse_as_with_options(&opts).unwrap();
    assert_eq!(config.url, "http://localhost:8080/");
    assert_eq!(config.missing_ref, "[]");
}

#[derive(Debug, Default, Env)]
struct Secrets {
    #[env("SECRET_FILE,file")]
    pub secret: String,
    #[env("TOKEN_FILE,file", default = "")]
    pub token: String,
}

#[test]
fn test_file_content_is_loaded() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "super_secret_key").unwrap();
    let path = file.path().to_string_lossy().into_owned();

    let config: Secrets =
        envtag::parse_as_with_options(&options(&[("SECRET_FILE", &path)])).unwrap();
    assert_eq!(config.secret, "super_secret_key");
    assert_eq!(config.token, "");
}

#[test]
fn test_missing_file_fails_with_key() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    let missing = missing.to_string_lossy().into_owned();

    let err = envtag::parse_as_with_options::<Secrets>(&options(&[("SECRET_FILE", &missing)]))
        .unwrap_err();
    assert_eq!(err.len(), 1);
    assert!(err.is(ErrorKind::LoadFile));
    assert!(err.to_string().contains("from variable SECRET_FILE"));
    let source = std::error::Error::source(&err.errors()[0]).unwrap();
    assert!(source.downcast_ref::<std::io::Error>().is_some());
}

#[derive(Debug, Default, Env)]
struct Unsetting {
    #[env("ENVTAG_IT_PASSWORD,unset")]
    pub password: String,
}

#[test]
#[serial]
fn test_unset_removes_variable_after_parse() {
    env::set_var("ENVTAG_IT_PASSWORD", "hunter2");

    let config = Unsetting::from_env().unwrap();
    assert_eq!(config.password, "hunter2");
    assert!(env::var("ENVTAG_IT_PASSWORD").is_err());
}

#[derive(Debug, Default, Env)]
#[allow(non_snake_case)]
struct Named {
    pub DatabaseURL: String,
    pub HTTPServer: String,
    pub ID: String,
    #[env("EXPLICIT")]
    pub explicit: String,
}

#[test]
fn test_field_name_synthesis() {
    let opts = options(&[
        ("DATABASE_URL", "postgres://"),
        ("HTTP_SERVER", "nginx"),
        ("ID", "42"),
        ("EXPLICIT", "yes"),
    ])
    .use_field_name_by_default(true);

    let config: Named = envtag::parse_as_with_options(&opts).unwrap();
    assert_eq!(config.DatabaseURL, "postgres://");
    assert_eq!(config.HTTPServer, "nginx");
    assert_eq!(config.ID, "42");
    assert_eq!(config.explicit, "yes");

    assert_eq!(envtag::to_env_name("DatabaseURL"), "DATABASE_URL");
    assert_eq!(envtag::to_env_name("HTTPServer"), "HTTP_SERVER");
    assert_eq!(envtag::to_env_name("ID"), "ID");
}

#[test]
fn test_non_struct_target() {
    let mut number = 0i32;
    let err = envtag::parse_with_options(&mut number, &options(&[])).unwrap_err();
    assert_eq!(err.len(), 1);
    assert!(err.is(ErrorKind::NotStruct));

    let mut missing: Option<Root> = None;
    let err = envtag::parse_with_options(&mut missing, &options(&[])).unwrap_err();
    assert_eq!(err.len(), 1);
    assert!(err.is(ErrorKind::NotStruct));
}

#[derive(Debug, Default, Env)]
struct Lazy {
    #[env(",init", prefix = "CACHE_")]
    pub cache: Option<Leaf>,
    #[env(prefix = "SPARE_")]
    pub spare: Option<Leaf>,
}

#[test]
fn test_init_allocates_optional_struct() {
    let config: Lazy =
        envtag::parse_as_with_options(&options(&[("CACHE_HOST", "redis"), ("SPARE_HOST", "x")]))
            .unwrap();
    let cache = config.cache.unwrap();
    assert_eq!(cache.host, "redis");
    assert!(config.spare.is_none());
}

#[test]
fn test_existing_values_are_kept() {
    let mut config = Lazy {
        cache: None,
        spare: Some(Leaf {
            port: 1,
            host: "before".to_string(),
        }),
    };
    envtag::parse_with_options(
        &mut config,
        &options(&[("SPARE_HOST", "after"), ("CACHE_HOST", "c")]),
    )
    .unwrap();

    let spare = config.spare.unwrap();
    assert_eq!(spare.host, "after");
    assert_eq!(spare.port, 1, "empty value leaves the field untouched");
    assert_eq!(config.cache.unwrap().port, 0);
}

#[derive(Debug, Default, Env)]
struct WithPrivate {
    #[env("PUBLIC")]
    pub public: String,
    #[env("PRIVATE")]
    private: String,
}

#[test]
fn test_private_fields_are_skipped() {
    let config: WithPrivate =
        envtag::parse_as_with_options(&options(&[("PUBLIC", "a"), ("PRIVATE", "b")])).unwrap();
    assert_eq!(config.public, "a");
    assert_eq!(config.private, "");
}

#[derive(Debug, Default, Env)]
struct Observed {
    #[env("SET")]
    pub set: String,
    #[env("DEFAULTED", default = "fallback")]
    pub defaulted: String,
    #[env(prefix = "IN_")]
    pub inner: Leaf,
}

#[test]
fn test_observer_sees_every_keyed_field() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let opts = options(&[("SET", "value"), ("IN_HOST", "h")]).on_set(move |key, value, is_default| {
        sink.lock()
            .unwrap()
            .push(format!("{key}={value}:{is_default}"));
    });

    envtag::parse_as_with_options::<Observed>(&opts).unwrap();
    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            "SET=value:false",
            "DEFAULTED=fallback:true",
            "IN_PORT=:false",
            "IN_HOST=h:false",
        ]
    );
}

#[test]
fn test_field_params_listing() {
    let params = envtag::field_params_with_options::<Root>(&options(&[])).unwrap();
    let keys: Vec<_> = params.iter().map(|p| p.key.as_str()).collect();
    assert_eq!(
        keys,
        vec!["NAME", "MID_ENABLED", "MID_LEAF_PORT", "MID_LEAF_HOST", "TIMEOUT"]
    );
    assert!(params[0].required);
    assert_eq!(params[4].default_value.as_deref(), Some("5s"));

    let json = serde_json::to_value(&params[4]).unwrap();
    assert_eq!(json["own_key"], "TIMEOUT");
    assert_eq!(json["default_value"], "5s");
}

#[derive(Debug, Default, Env)]
struct Unsupported {
    #[env("A,sometimes")]
    pub a: String,
    #[env("B")]
    pub b: u8,
}

#[test]
fn test_unsupported_option_does_not_stop_siblings() {
    let mut config = Unsupported::default();
    let err = envtag::parse_with_options(&mut config, &options(&[("A", "x"), ("B", "7")]))
        .unwrap_err();
    assert_eq!(err.len(), 1);
    assert!(err.is(ErrorKind::UnsupportedOption));
    assert_eq!(config.a, "");
    assert_eq!(config.b, 7);
}

#[test]
fn test_required_if_no_default() {
    let err = envtag::parse_as_with_options::<Expanding>(
        &options(&[]).required_if_no_default(true),
    )
    .unwrap_err();
    assert_eq!(err.len(), 1);
    assert!(err.to_string().contains(r#""URL""#));
}

#[derive(Debug, Default, Env)]
struct Timing {
    #[env("INTERVAL")]
    pub interval: Duration,
    #[env("ENDPOINT")]
    pub endpoint: Option<url::Url>,
    #[env("ZONE")]
    pub zone: Option<chrono_tz::Tz>,
}

#[test]
fn test_extended_types() {
    let config: Timing = envtag::parse_as_with_options(&options(&[
        ("INTERVAL", "1h 30m"),
        ("ENDPOINT", "https://example.com:8443/api"),
        ("ZONE", "Asia/Tokyo"),
    ]))
    .unwrap();
    assert_eq!(config.interval, Duration::from_secs(5400));
    assert_eq!(config.endpoint.unwrap().port(), Some(8443));
    assert_eq!(config.zone, Some(chrono_tz::Asia::Tokyo));
}

#[test]
fn test_custom_parser_overrides_default() {
    let opts = options(&[("INTERVAL", "90")])
        .parser::<Duration, _>(|text| Ok(Duration::from_secs(text.parse()?)));
    let config: Timing = envtag::parse_as_with_options(&opts).unwrap();
    assert_eq!(config.interval, Duration::from_secs(90));

    let bare = options(&[("INTERVAL", "1s")]).with_parsers(Parsers::empty());
    let err = envtag::parse_as_with_options::<Timing>(&bare).unwrap_err();
    assert!(err.is(ErrorKind::NoParser));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnvText)]
enum Level {
    Debug,
    Info,
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            other => Err(format!("unknown level {other:?}")),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Debug => "debug",
            Self::Info => "info",
        })
    }
}

#[derive(Debug, Default, Env)]
struct Logging {
    #[env("LEVEL")]
    pub level: Option<Level>,
    #[env("LEVELS")]
    pub levels: Vec<Level>,
    #[env("OVERRIDES")]
    pub overrides: HashMap<String, Level>,
}

#[test]
fn test_text_decodable_types() {
    let config: Logging = envtag::parse_as_with_options(&options(&[
        ("LEVEL", "debug"),
        ("LEVELS", "info,debug"),
        ("OVERRIDES", "db:debug"),
    ]))
    .unwrap();
    assert_eq!(config.level, Some(Level::Debug));
    assert_eq!(config.levels, vec![Level::Info, Level::Debug]);
    assert_eq!(config.overrides["db"], Level::Debug);

    let err = envtag::parse_as_with_options::<Logging>(&options(&[("LEVEL", "loud")]))
        .unwrap_err();
    assert!(err.to_string().contains(r#"unknown level "loud""#));
}

#[derive(Debug, Default, Env)]
struct Defaults {
    #[env("EMPTY_WITH_DEFAULT", default = "fallback")]
    pub empty_with_default: String,
    #[env("EXPLICIT_EMPTY_DEFAULT", default = "")]
    pub explicit_empty_default: String,
}

#[test]
fn test_empty_value_with_default_uses_default() {
    let config: Defaults = envtag::parse_as_with_options(&options(&[
        ("EMPTY_WITH_DEFAULT", ""),
        ("EXPLICIT_EMPTY_DEFAULT", ""),
    ]))
    .unwrap();
    assert_eq!(config.empty_with_default, "fallback");
    assert_eq!(config.explicit_empty_default, "");
}

#[derive(Debug, Default, Env)]
struct Retagged {
    #[env("IGNORED", cfg = "PORT", fallback = "80", default = "1")]
    pub port: u16,
}

#[test]
fn test_custom_tag_names() {
    let opts = options(&[]).tag_name("cfg").default_value_tag_name("fallback");
    let config: Retagged = envtag::parse_as_with_options(&opts).unwrap();
    assert_eq!(config.port, 80);

    let config: Retagged = envtag::parse_as_with_options(&options(&[("IGNORED", "2")])).unwrap();
    assert_eq!(config.port, 2);
}

#[test]
#[serial]
fn test_from_env_reads_process_environment() {
    env::set_var("NAME", "from-process");
    env::set_var("MID_LEAF_HOST", "h");
    env::remove_var("TIMEOUT");

    let config = Root::from_env().unwrap();
    assert_eq!(config.name, "from-process");
    assert_eq!(config.timeout, Duration::from_secs(5));

    let mut again = Root::default();
    envtag::parse(&mut again).unwrap();
    assert_eq!(again.middle.leaf.host, "h");

    env::remove_var("NAME");
    env::remove_var("MID_LEAF_HOST");
}

//! Custom converters and text-decodable types

use envtag::{BoxError, Env, EnvText, Options};
use std::fmt;
use std::str::FromStr;

/// Decoded through `FromStr` by `#[derive(EnvText)]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnvText)]
enum Environment {
    Development,
    Staging,
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "prod" | "production" => Ok(Self::Production),
            other => Err(format!("unknown environment {other:?}")),
        }
    }
}

/// Converted by a function registered on `Options`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Percent(f64);

impl envtag::EnvType for Percent {}

impl envtag::EnvField for Percent {
    fn type_name(&self) -> &'static str {
        <Self as envtag::EnvType>::type_name()
    }

    fn assign(
        &mut self,
        raw: &str,
        cx: &envtag::FieldContext<'_>,
    ) -> Result<(), envtag::EnvError> {
        *self = cx.convert::<Self>(raw)?;
        Ok(())
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0 * 100.0)
    }
}

fn parse_percent(text: &str) -> Result<Percent, BoxError> {
    let number = text.strip_suffix('%').ok_or("expected a trailing '%'")?;
    Ok(Percent(number.trim().parse::<f64>()? / 100.0))
}

#[derive(Debug, Default, Env)]
struct Config {
    #[env("APP_ENV")]
    pub environment: Option<Environment>,

    #[env("SAMPLE_RATE", default = "10%")]
    pub sample_rate: Percent,

    // Milliseconds instead of the default humantime syntax
    #[env("POLL_INTERVAL_MS", default = "250")]
    pub poll_interval: std::time::Duration,
}

fn main() -> anyhow::Result<()> {
    std::env::set_var("APP_ENV", "prod");

    let options = Options::default()
        .parser::<Percent, _>(parse_percent)
        .parser::<std::time::Duration, _>(|text| {
            Ok(std::time::Duration::from_millis(text.parse()?))
        });

    let config: Config = envtag::parse_as_with_options(&options)?;

    println!("Configuration loaded:");
    println!("  Environment: {:?}", config.environment);
    println!("  Sample Rate: {}", config.sample_rate);
    println!("  Poll Interval: {:?}", config.poll_interval);

    Ok(())
}

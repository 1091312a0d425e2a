//! Collections, durations, URLs and time zones

use envtag::Env;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

#[derive(Debug, Default, Env)]
struct Config {
    // Comma-separated by default
    #[env("ALLOWED_HOSTS")]
    pub allowed_hosts: Vec<String>,

    // Custom element separator
    #[env("PORTS", separator = ";")]
    pub ports: Vec<u16>,

    // key:value pairs
    #[env("FEATURE_FLAGS")]
    pub feature_flags: HashMap<String, bool>,

    // Both separators overridden
    #[env("POOL_SIZES", separator = ";", key_value_separator = "=")]
    pub pool_sizes: BTreeMap<String, u32>,

    #[env("REQUEST_TIMEOUT", default = "30s")]
    pub request_timeout: Duration,

    #[env("UPSTREAM_URL")]
    pub upstream_url: Option<url::Url>,

    #[env("APP_TIME_ZONE", default = "UTC")]
    pub time_zone: Option<chrono_tz::Tz>,
}

fn main() -> anyhow::Result<()> {
    std::env::set_var("ALLOWED_HOSTS", "localhost,example.com,api.example.com");
    std::env::set_var("PORTS", "8080;8443");
    std::env::set_var("FEATURE_FLAGS", "new_ui:true,beta_api:false");
    std::env::set_var("POOL_SIZES", "primary=20;replica=5");
    std::env::set_var("REQUEST_TIMEOUT", "1m 30s");
    std::env::set_var("UPSTREAM_URL", "https://upstream.example.com:9000/v1");

    let config = Config::from_env()?;

    println!("Configuration loaded:");
    println!("  Allowed Hosts: {:?}", config.allowed_hosts);
    println!("  Ports: {:?}", config.ports);
    println!("  Feature Flags: {:?}", config.feature_flags);
    println!("  Pool Sizes: {:?}", config.pool_sizes);
    println!("  Request Timeout: {:?}", config.request_timeout);
    if let Some(url) = &config.upstream_url {
        println!("  Upstream: {} (port {:?})", url, url.port());
    }
    println!("  Time Zone: {:?}", config.time_zone);

    Ok(())
}

//! Nested structs and key prefixes

use envtag::{Env, Options};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, Env)]
struct Database {
    #[env("HOST", default = "localhost")]
    pub host: String,

    #[env("PORT", default = "5432")]
    pub port: u16,
}

#[derive(Debug, Default, Env)]
struct Cache {
    #[env("URL,required")]
    pub url: String,
}

#[derive(Debug, Default, Env)]
struct Config {
    #[env("NAME", default = "demo")]
    pub name: String,

    // Reads MYAPP_DB_HOST, MYAPP_DB_PORT
    #[env(prefix = "DB_")]
    pub database: Database,

    // Allocated by `init`, then reads MYAPP_CACHE_URL
    #[env(",init", prefix = "CACHE_")]
    pub cache: Option<Cache>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("envtag=trace")),
        )
        .init();

    std::env::set_var("MYAPP_DB_HOST", "db.example.com");
    std::env::set_var("MYAPP_CACHE_URL", "redis://cache:6379");

    let options = Options::default().prefix("MYAPP_");
    let config: Config = envtag::parse_as_with_options(&options)?;

    println!("Configuration loaded:");
    println!("  Name: {}", config.name);
    println!("  Database: {}:{}", config.database.host, config.database.port);
    if let Some(cache) = &config.cache {
        println!("  Cache URL: {}", cache.url);
    }

    Ok(())
}

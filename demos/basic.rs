//! Basic usage example

use envtag::Env;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, Env)]
struct Config {
    // Required field: loaded from DATABASE_URL
    #[env("DATABASE_URL,required")]
    pub database_url: String,

    // With default value
    #[env("SERVER_ADDR", default = "127.0.0.1:8080")]
    pub server_addr: String,

    // Numeric type
    #[env("MAX_CONNECTIONS", default = "10")]
    pub max_connections: u32,

    // Boolean type
    #[env("DEBUG_MODE", default = "false")]
    pub debug_mode: bool,
}

fn main() -> anyhow::Result<()> {
    // RUST_LOG=envtag=debug shows which keys were resolved
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Set environment variables for demonstration
    std::env::set_var("DATABASE_URL", "postgres://localhost/mydb");
    std::env::set_var("SERVER_ADDR", "0.0.0.0:3000");

    // Load configuration
    let config = Config::from_env()?;

    println!("Configuration loaded:");
    println!("  Database URL: {}", config.database_url);
    println!("  Server Address: {}", config.server_addr);
    println!("  Max Connections: {}", config.max_connections);
    println!("  Debug Mode: {}", config.debug_mode);

    Ok(())
}

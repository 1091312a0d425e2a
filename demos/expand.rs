//! Variable expansion example

use envtag::Env;

#[derive(Debug, Default, Env)]
struct Config {
    #[env("DB_HOST", default = "localhost")]
    pub db_host: String,

    #[env("DB_PORT", default = "5432")]
    pub db_port: u16,

    // References earlier fields (including their defaults) and the environment
    #[env(
        "DATABASE_URL,expand",
        default = "postgres://${DB_USER}@${DB_HOST}:${DB_PORT}/app"
    )]
    pub database_url: String,

    // $HOME comes straight from the environment
    #[env("CACHE_DIR,expand", default = "$HOME/.cache/app")]
    pub cache_dir: String,
}

fn main() -> anyhow::Result<()> {
    std::env::set_var("DB_USER", "admin");
    std::env::set_var("DB_HOST", "db.internal");

    let config = Config::from_env()?;

    println!("Configuration loaded:");
    println!("  Database URL: {}", config.database_url);
    println!("  Cache Directory: {}", config.cache_dir);

    Ok(())
}

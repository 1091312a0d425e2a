//! File-based secrets example

use envtag::Env;
use std::io::Write;
use tempfile::NamedTempFile;

#[derive(Debug, Default, Env)]
struct Config {
    // The variable holds a path; the field receives the file's content
    #[env("API_KEY_FILE,file,required")]
    pub api_key: String,

    // Removed from the process environment once read
    #[env("DATABASE_PASSWORD_FILE,file,unset")]
    pub database_password: String,

    // Regular environment variable
    #[env("DATABASE_HOST", default = "localhost")]
    pub database_host: String,
}

fn main() -> anyhow::Result<()> {
    // Save API key to file
    let mut api_key_file = NamedTempFile::new()?;
    write!(api_key_file, "super_secret_api_key_12345")?;

    // Save database password to file
    let mut db_password_file = NamedTempFile::new()?;
    write!(db_password_file, "db_password_67890")?;

    std::env::set_var("API_KEY_FILE", api_key_file.path());
    std::env::set_var("DATABASE_PASSWORD_FILE", db_password_file.path());

    // Load configuration
    let config = Config::from_env()?;

    println!("Configuration loaded from files:");
    println!("  API Key: {}", config.api_key);
    println!("  Database Password: {}", config.database_password);
    println!("  Database Host: {}", config.database_host);
    println!(
        "  DATABASE_PASSWORD_FILE still set: {}",
        std::env::var_os("DATABASE_PASSWORD_FILE").is_some()
    );

    Ok(())
}

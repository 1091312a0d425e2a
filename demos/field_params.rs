//! Listing the variables a configuration reads

use envtag::{Env, Options};

#[derive(Debug, Default, Env)]
struct Database {
    #[env("URL,required,notEmpty")]
    pub url: String,

    #[env("PASSWORD_FILE,file,unset")]
    pub password: String,
}

#[derive(Debug, Default, Env)]
struct Config {
    #[env("PORT", default = "8080")]
    pub port: u16,

    #[env(prefix = "DB_")]
    pub database: Database,

    // No explicit key: synthesized from the field name
    pub log_format: String,
}

fn main() -> anyhow::Result<()> {
    let options = Options::default()
        .prefix("APP_")
        .use_field_name_by_default(true);

    let params = envtag::field_params_with_options::<Config>(&options)?;

    for param in &params {
        println!(
            "{:<24} required={:<5} default={:?}",
            param.key, param.required, param.default_value
        );
    }

    println!();
    println!("{}", serde_json::to_string_pretty(&params)?);

    Ok(())
}

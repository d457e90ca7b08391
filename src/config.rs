use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub jwt_secret: String,
    pub database_url: Option<String>,
    pub discord_bot_token: String,
    pub discord_application_channel_id: String,
    pub discord_api_base: String,
    pub mojang_api_base: String,
    pub identity_timeout_secs: u64,
    pub rate_limit_window_secs: u64,
    pub rate_limit_max_requests: u32,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            jwt_secret: get_env("JWT_SECRET")?,
            database_url: env::var("DATABASE_URL").ok(),
            discord_bot_token: get_env("DISCORD_BOT_TOKEN")?,
            discord_application_channel_id: get_env("DISCORD_APPLICATION_CHANNEL_ID")?,
            discord_api_base: get_env_or(
                "DISCORD_API_BASE",
                "https://discord.com/api/v10",
            ),
            mojang_api_base: get_env_or("MOJANG_API_BASE", "https://api.mojang.com"),
            identity_timeout_secs: get_env_parse_or("IDENTITY_TIMEOUT_SECS", 5)?,
            rate_limit_window_secs: get_env_parse_or("RATE_LIMIT_WINDOW_SECS", 1)?,
            rate_limit_max_requests: get_env_parse_or("RATE_LIMIT_MAX_REQUESTS", 30)?,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}

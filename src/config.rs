use dotenvy::dotenv;
use std::env;

use crate::error::AppError;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,

    // Rate limiting
    pub rate_general_per_min: u32,
    pub rate_import_per_min: u32,

    pub api_prefix: String,
}

fn required(key: &str) -> Result<String, AppError> {
    env::var(key).map_err(|_| AppError::Config(format!("{} must be set", key)))
}

fn per_min(key: &str, default: u32) -> Result<u32, AppError> {
    match env::var(key) {
        Err(_) => Ok(default),
        Ok(v) => v
            .parse()
            .map_err(|_| AppError::Config(format!("{} must be a number", key))),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,

            rate_general_per_min: per_min("RATE_GENERAL_PER_MIN", 600)?,
            rate_import_per_min: per_min("RATE_IMPORT_PER_MIN", 10)?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
        })
    }
}

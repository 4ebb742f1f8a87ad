use std::env;

use crate::ai::config::{parse_env, AiConfig};

pub const DEFAULT_DB_URL: &str = "sqlite:plates.db";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Clone, Debug)]
pub struct Config {
    pub db_url: String,
    pub bind_addr: String,
    pub rate_limit_per_second: Option<u64>,
    pub fallback_on_failure: bool,
    pub ai: Option<AiConfig>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let db_url = env::var("DB_URL").unwrap_or_else(|_| DEFAULT_DB_URL.to_string());
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let rate_limit_per_second =
            parse_env::<u64>("API_RATE_LIMIT_PER_SECOND").filter(|limit| *limit > 0);
        let fallback_on_failure = parse_env("FALLBACK_ON_FAILURE").unwrap_or(true);
        let ai = AiConfig::from_env();
        Self {
            db_url,
            bind_addr,
            rate_limit_per_second,
            fallback_on_failure,
            ai,
        }
    }
}

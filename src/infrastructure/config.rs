use std::env;

use crate::domain::{RepositoryError, DEFAULT_PER_PAGE};

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Reported as `server_name` in exception logs
    pub app_name: String,
    pub cors_allowed_origins: Vec<String>,
    pub webhook_domain_header: String,
    pub webhook_topic_header: String,
    pub page_size: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, RepositoryError> {
        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| RepositoryError::Configuration(format!("invalid PORT '{}'", raw)))?,
            Err(_) => 8000,
        };

        let page_size = match env::var("PAGE_SIZE") {
            Ok(raw) => match raw.parse::<u64>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(RepositoryError::Configuration(format!(
                        "invalid PAGE_SIZE '{}'",
                        raw
                    )))
                }
            },
            Err(_) => DEFAULT_PER_PAGE,
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://refineon_basic.db?mode=rwc".to_string()),
            port,
            app_name: env::var("APP_NAME").unwrap_or_else(|_| "refineon-basic".to_string()),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(Vec::new),
            webhook_domain_header: env::var("WEBHOOK_DOMAIN_HEADER")
                .unwrap_or_else(|_| "x-shopify-shop-domain".to_string()),
            webhook_topic_header: env::var("WEBHOOK_TOPIC_HEADER")
                .unwrap_or_else(|_| "x-shopify-topic".to_string()),
            page_size,
        })
    }
}

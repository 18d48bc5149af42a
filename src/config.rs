use std::{env, net::SocketAddr};

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub listen_addr: SocketAddr,
    pub base_url: String,
    pub mail: MailConfig,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub enabled: bool,
    pub from: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            from: "no-reply@planner.local".into(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://planner.db".to_string());
        let listen_addr: SocketAddr = env::var("APP_LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|err| AppError::Config(format!("invalid APP_LISTEN_ADDR: {err}")))?;

        let base_url =
            env::var("APP_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let defaults = MailConfig::default();
        let from = env::var("MAIL_FROM").unwrap_or(defaults.from);
        let enabled = match env::var("MAIL_ENABLED") {
            Ok(raw) => parse_flag(&raw)
                .ok_or_else(|| AppError::Config(format!("invalid MAIL_ENABLED: {raw}")))?,
            Err(_) => defaults.enabled,
        };

        Ok(Self {
            database_url,
            listen_addr,
            base_url,
            mail: MailConfig { enabled, from },
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// src/config.rs

use std::env;
use std::time::Duration;

use url::Url;

use crate::errors::AppError;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
const DEFAULT_UPLOAD_SESSION_TTL_SECS: u64 = 30 * 60;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    /// Czas bezczynności, po którym sesja wybranych plików wygasa.
    pub upload_session_ttl: Duration,
    /// Brak adresu oznacza backend w pamięci.
    pub product_backend_url: Option<Url>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            upload_session_ttl: Duration::from_secs(DEFAULT_UPLOAD_SESSION_TTL_SECS),
            product_backend_url: None,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("Invalid {} value: '{}'", name, raw))),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = AppConfig::default();

        let product_backend_url = match env::var("PRODUCT_BACKEND_URL") {
            Ok(raw) if !raw.trim().is_empty() => Some(Url::parse(raw.trim()).map_err(|e| {
                AppError::Config(format!("Invalid PRODUCT_BACKEND_URL '{}': {}", raw, e))
            })?),
            _ => None,
        };

        Ok(AppConfig {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port)?,
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            upload_session_ttl: Duration::from_secs(parse_var(
                "UPLOAD_SESSION_TTL_SECS",
                DEFAULT_UPLOAD_SESSION_TTL_SECS,
            )?),
            product_backend_url,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_listen_on_port_3000_without_backend() {
        let config = AppConfig::default();
        assert_eq!(config.server_address(), "0.0.0.0:3000");
        assert!(config.product_backend_url.is_none());
        assert_eq!(config.upload_session_ttl, Duration::from_secs(1800));
    }
}

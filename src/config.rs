/*
 * Responsibility
 * - Read settings from the environment (.env supported via dotenvy)
 * - Validate them; anything missing or malformed fails startup
 */
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // JSON pipeline definition, see `pipeline::factory`
    pub pipeline_path: PathBuf,

    pub request_timeout_seconds: u64,
    pub request_body_limit_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = parse_or("PORT", &lookup, 3000)?;

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = lookup("APP_ENV")
            .map(|v| AppEnv::parse(&v))
            .unwrap_or(AppEnv::Development);

        let pipeline_path = lookup("CLAIMGATE_PIPELINE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .ok_or(ConfigError::Missing("CLAIMGATE_PIPELINE"))?;

        let request_timeout_seconds = parse_or("REQUEST_TIMEOUT_SECONDS", &lookup, 30)?;
        let request_body_limit_bytes = parse_or("REQUEST_BODY_LIMIT_BYTES", &lookup, 1024 * 1024)?;

        Ok(Self {
            addr,
            app_env,
            pipeline_path,
            request_timeout_seconds,
            request_body_limit_bytes,
        })
    }
}

fn parse_or<T: FromStr>(
    key: &'static str,
    lookup: &impl Fn(&str) -> Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = config(&[("CLAIMGATE_PIPELINE", "config/pipeline.json")]).unwrap();

        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.pipeline_path, PathBuf::from("config/pipeline.json"));
        assert_eq!(config.request_timeout_seconds, 30);
        assert_eq!(config.request_body_limit_bytes, 1024 * 1024);
    }

    #[test]
    fn pipeline_path_is_required() {
        assert_eq!(
            config(&[]).unwrap_err(),
            ConfigError::Missing("CLAIMGATE_PIPELINE")
        );
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        assert_eq!(
            config(&[("CLAIMGATE_PIPELINE", "p.json"), ("PORT", "http")]).unwrap_err(),
            ConfigError::Invalid("PORT")
        );
        assert_eq!(
            config(&[
                ("CLAIMGATE_PIPELINE", "p.json"),
                ("REQUEST_TIMEOUT_SECONDS", "-1")
            ])
            .unwrap_err(),
            ConfigError::Invalid("REQUEST_TIMEOUT_SECONDS")
        );
    }

    #[test]
    fn production_env_is_recognised() {
        let config = config(&[("CLAIMGATE_PIPELINE", "p.json"), ("APP_ENV", "PROD")]).unwrap();
        assert!(config.app_env.is_production());
    }
}

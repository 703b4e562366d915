use std::{env, path::PathBuf, str::FromStr, time::Duration};
use dotenv::dotenv;

use crate::error::AppError;

pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://api.ecoledirecte.com/v3/";
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub host: String,
    /// Always ends with `/`, so `upstream_base_url + sub_path` is the target.
    pub upstream_base_url: String,
    pub static_root: PathBuf,
    /// `None` leaves the transport default in place.
    pub upstream_timeout: Option<Duration>,
    pub max_body_bytes: usize,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "127.0.0.1".to_string(),
            upstream_base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
            static_root: PathBuf::from("."),
            upstream_timeout: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            log_format: LogFormat::Compact,
        }
    }
}

impl AppConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let defaults = Self::default();

        let static_root = match env::var("STATIC_ROOT") {
            Ok(root) if !root.is_empty() => PathBuf::from(root),
            _ => env::current_dir().unwrap_or(defaults.static_root),
        };

        let upstream_timeout = match env::var("UPSTREAM_TIMEOUT_SECS") {
            Ok(secs) if !secs.is_empty() => {
                Some(Duration::from_secs(parse_var("UPSTREAM_TIMEOUT_SECS", &secs)?))
            }
            _ => None,
        };

        let log_format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("compact") | Ok("") | Err(_) => LogFormat::Compact,
            Ok(other) => {
                return Err(AppError::Config(format!(
                    "LOG_FORMAT must be `compact` or `json`, got `{}`",
                    other
                )))
            }
        };

        Ok(Self {
            port: var_or("PORT", defaults.port)?,
            host: match env::var("HOST") {
                Ok(host) if !host.trim().is_empty() => host.trim().to_string(),
                _ => defaults.host,
            },
            upstream_base_url: normalize_base_url(
                &env::var("UPSTREAM_BASE_URL").unwrap_or(defaults.upstream_base_url),
            )?,
            static_root,
            upstream_timeout,
            max_body_bytes: var_or("MAX_BODY_BYTES", defaults.max_body_bytes)?,
            log_format,
        })
    }

    /// Host and port to bind; the host may be a name such as `localhost`,
    /// resolved at bind time.
    pub fn listen_address(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

fn var_or<T: FromStr>(name: &str, default: T) -> Result<T, AppError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) if !value.is_empty() => parse_var(name, &value),
        _ => Ok(default),
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T, AppError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AppError::Config(format!("{} has invalid value `{}`: {}", name, value, e)))
}

pub fn normalize_base_url(raw: &str) -> Result<String, AppError> {
    let parsed = url::Url::parse(raw).map_err(|e| {
        AppError::Config(format!("UPSTREAM_BASE_URL `{}` is not a URL: {}", raw, e))
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::Config(format!(
            "UPSTREAM_BASE_URL must use http or https, got `{}`",
            parsed.scheme()
        )));
    }

    let mut base = raw.to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Ok(base)
}

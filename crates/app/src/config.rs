use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: SocketAddr,
    pub api_url: String,
    pub request_timeout: Duration,
    pub page_size: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid socket address: {0}")]
    InvalidSocket(String),
    #[error("invalid integer for {0}: {1}")]
    InvalidNumber(&'static str, String),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_addr_raw = read_string("MARGINALIA_HTTP_ADDR", "127.0.0.1:8080");
        let http_addr = http_addr_raw
            .parse()
            .map_err(|_| ConfigError::InvalidSocket(http_addr_raw.clone()))?;
        let api_url = read_string("MARGINALIA_API_URL", "http://127.0.0.1:8080");
        if api_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue("MARGINALIA_API_URL", api_url));
        }
        let request_timeout_secs = read_u64("MARGINALIA_REQUEST_TIMEOUT_SECS", 15)?;
        let page_size = read_usize("MARGINALIA_PAGE_SIZE", 10)?;
        if page_size == 0 {
            return Err(ConfigError::InvalidValue(
                "MARGINALIA_PAGE_SIZE",
                page_size.to_string(),
            ));
        }

        Ok(Self {
            http_addr,
            api_url,
            request_timeout: Duration::from_secs(request_timeout_secs),
            page_size,
        })
    }
}

pub fn load_dotenv() -> Result<(), std::io::Error> {
    let path = Path::new(".env");
    if !path.exists() {
        return Ok(());
    }
    let contents = std::fs::read_to_string(path)?;
    for (key, value) in contents.lines().filter_map(parse_dotenv_line) {
        if std::env::var_os(&key).is_none() {
            // Safety: invoked during startup before any threads are spawned.
            unsafe {
                std::env::set_var(key, value);
            }
        }
    }
    Ok(())
}

fn read_string(key: &'static str, default: &'static str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn read_u64(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .map_err(|_| ConfigError::InvalidNumber(key, raw))
}

fn read_usize(key: &'static str, default: usize) -> Result<usize, ConfigError> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .map_err(|_| ConfigError::InvalidNumber(key, raw))
}

fn parse_dotenv_line(line: &str) -> Option<(String, String)> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
    let (key, value) = trimmed.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    let value = value.trim();
    let value = value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .or_else(|| {
            value
                .strip_prefix('\'')
                .and_then(|inner| inner.strip_suffix('\''))
        })
        .unwrap_or(value);
    Some((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::parse_dotenv_line;

    #[test]
    fn parse_dotenv_line_basic() {
        let (key, value) = parse_dotenv_line("FOO=bar").unwrap();
        assert_eq!(key, "FOO");
        assert_eq!(value, "bar");
    }

    #[test]
    fn parse_dotenv_line_export() {
        let (key, value) = parse_dotenv_line("export FOO=bar").unwrap();
        assert_eq!(key, "FOO");
        assert_eq!(value, "bar");
    }

    #[test]
    fn parse_dotenv_line_quotes() {
        let (_, value) = parse_dotenv_line(r#"FOO="hello world""#).unwrap();
        assert_eq!(value, "hello world");
        let (_, value) = parse_dotenv_line("FOO='hello world'").unwrap();
        assert_eq!(value, "hello world");
    }

    #[test]
    fn parse_dotenv_line_comment() {
        assert!(parse_dotenv_line("# comment").is_none());
        assert!(parse_dotenv_line("   ").is_none());
    }
}

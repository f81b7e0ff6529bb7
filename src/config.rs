use std::collections::HashMap;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        Ok(Self {
            database_url,
            max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8080),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Settings for the standalone login app.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginAppConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origin: String,
    pub credentials: HashMap<String, String>,
}

impl LoginAppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let credentials = match std::env::var("LOGIN_CREDENTIALS") {
            Ok(raw) => parse_credentials(&raw).context("parse LOGIN_CREDENTIALS")?,
            Err(_) => default_credentials(),
        };
        Ok(Self {
            host: std::env::var("LOGIN_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("LOGIN_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8000),
            allowed_origin: std::env::var("LOGIN_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            credentials,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub fn default_credentials() -> HashMap<String, String> {
    HashMap::from([("testuser".to_string(), "testpass".to_string())])
}

/// Parses `user:pass,user2:pass2`. The password may itself contain `:`.
pub fn parse_credentials(raw: &str) -> anyhow::Result<HashMap<String, String>> {
    let mut table = HashMap::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (user, pass) = entry
            .split_once(':')
            .with_context(|| format!("credential entry `{entry}` is missing `:`"))?;
        if user.is_empty() {
            anyhow::bail!("credential entry `{entry}` has an empty username");
        }
        table.insert(user.to_string(), pass.to_string());
    }
    if table.is_empty() {
        anyhow::bail!("no credentials configured");
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multiple_pairs() {
        let table = parse_credentials("alice:secret, bob:pa:ss").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table["alice"], "secret");
        assert_eq!(table["bob"], "pa:ss");
    }

    #[test]
    fn rejects_entry_without_separator() {
        let err = parse_credentials("alice").unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn rejects_empty_table() {
        assert!(parse_credentials(" , ").is_err());
    }

    #[test]
    fn default_table_has_test_user() {
        let table = default_credentials();
        assert_eq!(table.get("testuser").map(String::as_str), Some("testpass"));
    }
}

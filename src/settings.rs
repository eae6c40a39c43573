//! Runtime settings from the environment. Call `dotenvy::dotenv()` first if a `.env` file
//! should be honored.

use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/autoinstall";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SettingsError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub database_max_connections: u32,
    pub database_connect_timeout: Duration,
    pub server_host: String,
    pub server_port: u16,
    /// Maximum request body size in bytes.
    pub request_body_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database_url: DEFAULT_DATABASE_URL.into(),
            database_max_connections: 5,
            database_connect_timeout: Duration::from_secs(15),
            server_host: "127.0.0.1".into(),
            server_port: 8000,
            request_body_limit: 1024 * 1024,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let defaults = Settings::default();
        Ok(Settings {
            database_url: lookup("DATABASE_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.database_url),
            database_max_connections: parse(&lookup, "DATABASE_MAX_CONNECTIONS")?
                .unwrap_or(defaults.database_max_connections),
            database_connect_timeout: parse(&lookup, "DATABASE_CONNECT_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.database_connect_timeout),
            server_host: lookup("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse(&lookup, "SERVER_PORT")?.unwrap_or(defaults.server_port),
            request_body_limit: parse(&lookup, "REQUEST_BODY_LIMIT")?
                .unwrap_or(defaults.request_body_limit),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, SettingsError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| SettingsError::Invalid { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let s = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.bind_addr(), "127.0.0.1:8000");
    }

    #[test]
    fn overrides_are_parsed() {
        let s = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/other"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("DATABASE_CONNECT_TIMEOUT_SECS", "3"),
            ("SERVER_PORT", " 9000 "),
            ("REQUEST_BODY_LIMIT", "2048"),
        ]))
        .unwrap();
        assert_eq!(s.database_url, "postgres://db/other");
        assert_eq!(s.database_max_connections, 12);
        assert_eq!(s.database_connect_timeout, Duration::from_secs(3));
        assert_eq!(s.server_port, 9000);
        assert_eq!(s.request_body_limit, 2048);
    }

    #[test]
    fn bad_number_is_reported_with_key() {
        let err = Settings::from_lookup(lookup(&[("SERVER_PORT", "eighty")])).unwrap_err();
        assert_eq!(
            err,
            SettingsError::Invalid {
                key: "SERVER_PORT",
                value: "eighty".into()
            }
        );
    }
}

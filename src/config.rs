use anyhow::{bail, Result};
use serde::Deserialize;
use std::env;

pub const DEFAULT_RETENTION_LIMIT: usize = 5;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub history: HistoryConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// When unset the service keeps its history in memory.
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    pub retention_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let retention_limit: usize =
            var("RETENTION_LIMIT", &DEFAULT_RETENTION_LIMIT.to_string()).parse()?;
        if retention_limit == 0 {
            bail!("RETENTION_LIMIT must be at least 1");
        }

        Ok(Self {
            server: ServerConfig {
                port: var("PORT", "8000").parse()?,
                host: var("HOST", "0.0.0.0"),
                cors_allowed_origins: var("ALLOWED_ORIGINS", "http://localhost:3000")
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            database: DatabaseConfig {
                url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
                max_connections: var("DB_MAX_CONNECTIONS", "10").parse()?,
                min_connections: var("DB_MIN_CONNECTIONS", "1").parse()?,
            },
            history: HistoryConfig { retention_limit },
            upload: UploadConfig {
                max_upload_bytes: var("MAX_UPLOAD_BYTES", &DEFAULT_MAX_UPLOAD_BYTES.to_string())
                    .parse()?,
            },
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: 8000,
                host: "0.0.0.0".to_string(),
                cors_allowed_origins: vec!["http://localhost:3000".to_string()],
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                min_connections: 1,
            },
            history: HistoryConfig {
                retention_limit: DEFAULT_RETENTION_LIMIT,
            },
            upload: UploadConfig {
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = Config::from_lookup(|_| None).unwrap();

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.cors_allowed_origins, vec!["http://localhost:3000"]);
        assert!(config.database.url.is_none());
        assert_eq!(config.history.retention_limit, DEFAULT_RETENTION_LIMIT);
        assert_eq!(config.upload.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn test_overrides_from_lookup() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "9100"),
            ("ALLOWED_ORIGINS", "http://a.test, http://b.test,"),
            ("DATABASE_URL", "postgres://localhost/summaries"),
            ("RETENTION_LIMIT", "3"),
            ("MAX_UPLOAD_BYTES", "1024"),
        ]))
        .unwrap();

        assert_eq!(config.server.port, 9100);
        assert_eq!(
            config.server.cors_allowed_origins,
            vec!["http://a.test", "http://b.test"]
        );
        assert_eq!(
            config.database.url.as_deref(),
            Some("postgres://localhost/summaries")
        );
        assert_eq!(config.history.retention_limit, 3);
        assert_eq!(config.upload.max_upload_bytes, 1024);
    }

    #[test]
    fn test_blank_database_url_is_ignored() {
        let config = Config::from_lookup(lookup_from(&[("DATABASE_URL", "  ")])).unwrap();
        assert!(config.database.url.is_none());
    }

    #[test]
    fn test_rejects_zero_retention_limit() {
        assert!(Config::from_lookup(lookup_from(&[("RETENTION_LIMIT", "0")])).is_err());
    }

    #[test]
    fn test_rejects_unparseable_port() {
        assert!(Config::from_lookup(lookup_from(&[("PORT", "eighty")])).is_err());
    }
}

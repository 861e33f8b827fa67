//! Configuration module for massmail.

use serde::Deserialize;
use std::path::Path;

use crate::{MassmailError, Result};

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/massmail.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/massmail.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Which transport delivers outgoing mail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MailBackend {
    /// Write every message to the log and report success.
    #[default]
    Log,
    /// Keep messages in an in-process outbox.
    Memory,
}

/// Outgoing mail configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// Transport backend.
    #[serde(default)]
    pub backend: MailBackend,
    /// Sender address used in the From header.
    #[serde(default = "default_from_address")]
    pub from_address: String,
}

fn default_from_address() -> String {
    "noreply@localhost".to_string()
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            backend: MailBackend::default(),
            from_address: default_from_address(),
        }
    }
}

/// Listing cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Seconds a cached listing stays fresh (0 disables caching).
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

fn default_cache_ttl() -> u64 {
    900 // 15 minutes
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
        }
    }
}

/// Web server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Host address to bind.
    #[serde(default = "default_web_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// JWT secret key.
    #[serde(default)]
    pub jwt_secret: String,
    /// Access token expiry in seconds.
    #[serde(default = "default_jwt_access_expiry")]
    pub jwt_access_token_expiry_secs: u64,
    /// Usernames that receive the admin role when they register.
    #[serde(default)]
    pub admin_usernames: Vec<String>,
}

fn default_web_host() -> String {
    "0.0.0.0".to_string()
}

fn default_web_port() -> u16 {
    8080
}

fn default_jwt_access_expiry() -> u64 {
    3600 // 1 hour
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
            cors_origins: vec![],
            jwt_secret: String::new(),
            jwt_access_token_expiry_secs: default_jwt_access_expiry(),
            admin_usernames: vec![],
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Web server configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Outgoing mail configuration.
    #[serde(default)]
    pub mail: MailConfig,
    /// Listing cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(MassmailError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| MassmailError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `MASSMAIL_JWT_SECRET`: Override the JWT secret key
    pub fn apply_env_overrides(&mut self) {
        if let Ok(jwt_secret) = std::env::var("MASSMAIL_JWT_SECRET") {
            if !jwt_secret.is_empty() {
                self.web.jwt_secret = jwt_secret;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.web.jwt_secret.is_empty() {
            return Err(MassmailError::Config(
                "jwt_secret is not set. \
                 Set it in config.toml or via MASSMAIL_JWT_SECRET environment variable."
                    .to_string(),
            ));
        }
        if !self.mail.from_address.contains('@') {
            return Err(MassmailError::Config(format!(
                "invalid mail.from_address: {}",
                self.mail.from_address
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.web.host, "0.0.0.0");
        assert_eq!(config.web.port, 8080);
        assert!(config.web.cors_origins.is_empty());
        assert!(config.web.jwt_secret.is_empty());
        assert_eq!(config.web.jwt_access_token_expiry_secs, 3600);

        assert_eq!(config.database.path, "data/massmail.db");

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/massmail.log");

        assert_eq!(config.mail.backend, MailBackend::Log);
        assert_eq!(config.mail.from_address, "noreply@localhost");

        assert_eq!(config.cache.ttl_secs, 900);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[web]
host = "127.0.0.1"
port = 9000
cors_origins = ["http://localhost:3000"]
jwt_secret = "s3cret"
jwt_access_token_expiry_secs = 60
admin_usernames = ["root"]

[database]
path = "custom/db.sqlite"

[logging]
level = "debug"
file = "custom/massmail.log"

[mail]
backend = "memory"
from_address = "news@example.com"

[cache]
ttl_secs = 0
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.web.host, "127.0.0.1");
        assert_eq!(config.web.port, 9000);
        assert_eq!(config.web.cors_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.web.jwt_secret, "s3cret");
        assert_eq!(config.web.jwt_access_token_expiry_secs, 60);
        assert_eq!(config.web.admin_usernames, vec!["root"]);
        assert_eq!(config.database.path, "custom/db.sqlite");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, "custom/massmail.log");
        assert_eq!(config.mail.backend, MailBackend::Memory);
        assert_eq!(config.mail.from_address, "news@example.com");
        assert_eq!(config.cache.ttl_secs, 0);
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[web]
port = 3000
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.web.port, 3000);
        assert_eq!(config.web.host, "0.0.0.0");
        assert_eq!(config.database.path, "data/massmail.db");
        assert_eq!(config.cache.ttl_secs, 900);
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("this is not valid toml [[[");

        assert!(result.is_err());
        if let Err(MassmailError::Config(msg)) = result {
            assert!(msg.contains("config parse error"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_parse_unknown_backend() {
        let result = Config::parse("[mail]\nbackend = \"smtp\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");
        assert!(matches!(result, Err(MassmailError::Io(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[database]\npath = \"x.db\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.database.path, "x.db");
    }

    #[test]
    fn test_apply_env_overrides_jwt_secret() {
        let original = std::env::var("MASSMAIL_JWT_SECRET").ok();

        std::env::set_var("MASSMAIL_JWT_SECRET", "env-secret-key");

        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.web.jwt_secret, "env-secret-key");

        if let Some(val) = original {
            std::env::set_var("MASSMAIL_JWT_SECRET", val);
        } else {
            std::env::remove_var("MASSMAIL_JWT_SECRET");
        }
    }

    #[test]
    fn test_validate_requires_secret() {
        let config = Config::default();
        let result = config.validate();
        assert!(matches!(result, Err(MassmailError::Config(msg)) if msg.contains("jwt_secret")));
    }

    #[test]
    fn test_validate_from_address() {
        let mut config = Config::default();
        config.web.jwt_secret = "secret".to_string();
        assert!(config.validate().is_ok());

        config.mail.from_address = "nobody".to_string();
        assert!(config.validate().is_err());
    }
}

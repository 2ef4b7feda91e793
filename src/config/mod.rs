use serde::Serialize;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Configuration read once at process start and handed to the app through `AppState`.
#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub bootstrap: Option<BootstrapUser>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseConfig {
    pub storage: StorageBackend,
    #[serde(skip_serializing)]
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    pub enable_docs: bool,
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

/// Account created at start-up when it does not exist yet.
#[derive(Debug, Clone, Serialize)]
pub struct BootstrapUser {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{0}")]
    Unsupported(String),
}

const DEV_JWT_SECRET: &str = "development-only-secret";

/// Upper bound for `SECURITY_JWT_EXPIRY_HOURS` (one year)
pub const MAX_JWT_EXPIRY_HOURS: u64 = 24 * 365;

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            Some("development") | Some("dev") | None => Environment::Development,
            Some(other) => {
                return Err(ConfigError::InvalidValue { var: "APP_ENV", value: other.to_string() })
            }
        };

        // Start from the environment preset, then apply explicit overrides
        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        };

        config.with_overrides(&lookup)?.validated()
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server
        if let Some(v) = lookup("CATS_API_PORT").or_else(|| lookup("PORT")) {
            self.server.port = parse_var("CATS_API_PORT", &v)?;
        }
        if let Some(v) = lookup("CATS_BIND_ADDR") {
            self.server.bind_addr = v;
        }

        // Database
        self.database.url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());
        self.database.storage = match lookup("CATS_STORAGE").as_deref() {
            Some("postgres") | Some("pg") => StorageBackend::Postgres,
            Some("memory") => StorageBackend::Memory,
            Some(other) => {
                return Err(ConfigError::InvalidValue { var: "CATS_STORAGE", value: other.to_string() })
            }
            None if self.database.url.is_some() => StorageBackend::Postgres,
            None => StorageBackend::Memory,
        };
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_var("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse_var("DATABASE_CONNECTION_TIMEOUT", &v)?;
        }
        if let Some(v) = lookup("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = parse_var("DATABASE_RUN_MIGRATIONS", &v)?;
        }

        // API
        if let Some(v) = lookup("API_ENABLE_DOCS") {
            self.api.enable_docs = parse_var("API_ENABLE_DOCS", &v)?;
        }
        if let Some(v) = lookup("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = parse_var("API_ENABLE_REQUEST_LOGGING", &v)?;
        }
        if let Some(v) = lookup("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = parse_var("API_MAX_REQUEST_SIZE_BYTES", &v)?;
        }

        // Security
        if let Some(v) = lookup("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = parse_var("SECURITY_ENABLE_CORS", &v)?;
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(v) = lookup("SECURITY_JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Some(v) = lookup("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = parse_var("SECURITY_JWT_EXPIRY_HOURS", &v)?;
        }

        // Bootstrap account
        self.bootstrap = match (lookup("CATS_ADMIN_USERNAME"), lookup("CATS_ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => Some(BootstrapUser { username, password }),
            (Some(_), None) => return Err(ConfigError::Missing("CATS_ADMIN_PASSWORD")),
            (None, Some(_)) => return Err(ConfigError::Missing("CATS_ADMIN_USERNAME")),
            (None, None) => None,
        };

        Ok(self)
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.database.storage == StorageBackend::Postgres && self.database.url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        if self.environment == Environment::Production && self.database.storage == StorageBackend::Memory {
            return Err(ConfigError::Unsupported(
                "memory storage is not allowed in production".to_string(),
            ));
        }
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("SECURITY_JWT_SECRET"));
        }
        if !(1..=MAX_JWT_EXPIRY_HOURS).contains(&self.security.jwt_expiry_hours) {
            return Err(ConfigError::InvalidValue {
                var: "SECURITY_JWT_EXPIRY_HOURS",
                value: self.security.jwt_expiry_hours.to_string(),
            });
        }
        Ok(self)
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.database.connection_timeout)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                bind_addr: "0.0.0.0".to_string(),
                port: 8000,
            },
            database: DatabaseConfig {
                storage: StorageBackend::Memory,
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            api: ApiConfig {
                enable_docs: true,
                enable_request_logging: true,
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                jwt_secret: DEV_JWT_SECRET.to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
            },
            bootstrap: None,
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                bind_addr: "0.0.0.0".to_string(),
                port: 8000,
            },
            database: DatabaseConfig {
                storage: StorageBackend::Postgres,
                url: None,
                max_connections: 20,
                connection_timeout: 10,
                run_migrations: true,
            },
            api: ApiConfig {
                enable_docs: true,
                enable_request_logging: true,
                max_request_size_bytes: 256 * 1024,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
            },
            bootstrap: None,
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                bind_addr: "0.0.0.0".to_string(),
                port: 8000,
            },
            database: DatabaseConfig {
                storage: StorageBackend::Postgres,
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                run_migrations: false,
            },
            api: ApiConfig {
                enable_docs: false,
                enable_request_logging: false,
                max_request_size_bytes: 64 * 1024,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
            },
            bootstrap: None,
        }
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { var, value: value.to_string() })
}

use crate::error::ConfigError;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
const DEV_JWT_SECRET: &str = "change-me-in-production";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_secs: 3600,
        }
    }
}

impl AuthConfig {
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    /// Tokens signed with the built-in secret can be forged by anyone, so
    /// serving with it needs an explicit opt-in.
    pub fn ensure_serving_secret(&self, allow_dev_secret: bool) -> Result<(), ConfigError> {
        if self.uses_dev_secret() && !allow_dev_secret {
            return Err(ConfigError::InsecureSecret);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Libsql,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// libSQL URL or local database path
    pub url: Option<String>,
    #[serde(skip)]
    pub auth_token: Option<String>,
}

impl Config {
    /// Read `path` if it exists (defaults otherwise), then apply environment
    /// overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        config.apply_env(|key| env::var(key).ok())?;
        Ok(config)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(host) = var("CAT_API_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("CAT_API_PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: "CAT_API_PORT".to_string(),
                value: port,
            })?;
        }
        if let Some(secret) = var("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(backend) = var("CAT_STORE_BACKEND") {
            self.storage.backend = match backend.to_lowercase().as_str() {
                "memory" => StorageBackend::Memory,
                "libsql" => StorageBackend::Libsql,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "CAT_STORE_BACKEND".to_string(),
                        value: backend,
                    })
                }
            };
        }
        if let Some(url) = var("LIBSQL_URL") {
            self.storage.url = Some(url);
        }
        self.storage.auth_token = var("LIBSQL_AUTH_TOKEN");
        Ok(())
    }
}

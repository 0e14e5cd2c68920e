use thiserror::Error;

/// Failures raised by a `CatStore` backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures returned by the cat resolvers
#[derive(Error, Debug)]
pub enum CatError {
    #[error("Cat not found")]
    NotFound,

    #[error("User not authenticated")]
    Unauthenticated,

    #[error("{0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl CatError {
    /// Machine-readable tag carried to the client, if this kind has one
    pub fn code(&self) -> Option<&'static str> {
        match self {
            CatError::NotFound => Some("NOT_FOUND"),
            CatError::Unauthenticated => Some("UNAUTHENTICATED"),
            CatError::Internal(_) | CatError::Store(_) => None,
        }
    }

    /// Short label used for metrics and logs
    pub fn outcome(&self) -> &'static str {
        match self {
            CatError::NotFound => "not_found",
            CatError::Unauthenticated => "unauthenticated",
            CatError::Internal(_) => "internal",
            CatError::Store(_) => "store_error",
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("JWT_SECRET is not set; refusing to serve with the built-in development secret (pass --insecure-dev-secret to override)")]
    InsecureSecret,
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

pub type Result<T> = std::result::Result<T, CatError>;

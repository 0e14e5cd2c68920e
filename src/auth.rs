//! Session context and bearer-token handling.
//!
//! Every resolver call receives a [`Session`]. The HTTP layer builds it from
//! the `Authorization` header; anything short of a valid token yields an
//! anonymous session.

use crate::error::AuthError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    #[serde(other)]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
    pub role: Role,
}

impl SessionUser {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Per-request session context
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<SessionUser>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn authenticated(user: SessionUser) -> Self {
        Self { user: Some(user) }
    }
}

/// JWT claims carried in the bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: String, role: Role, expires_in: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            role,
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        }
    }
}

/// HS256 token codec sharing one secret for signing and verification
pub struct JwtAuth {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtAuth {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::default(),
        }
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, AuthError> {
        Ok(encode(&Header::default(), claims, &self.encoding_key)?)
    }

    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        Ok(decode::<Claims>(token, &self.decoding_key, &self.validation)?.claims)
    }

    /// Build a session from an `Authorization` header value
    pub fn session_from_header(&self, header: Option<&str>) -> Session {
        let Some(token) = header.and_then(bearer_token) else {
            return Session::anonymous();
        };

        match self.decode(token.trim()) {
            Ok(claims) => Session::authenticated(SessionUser::new(claims.sub, claims.role)),
            Err(e) => {
                debug!("Rejected bearer token: {}", e);
                Session::anonymous()
            }
        }
    }
}

/// Token part of `Bearer <token>`; the scheme name is case-insensitive
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then_some(token)
}

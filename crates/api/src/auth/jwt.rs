//! Access/refresh token issuance and validation

use eyantra_shared::{Admin, AdminId};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::config::Config;

/// Clock skew tolerated on `exp`, in seconds
const LEEWAY_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (admin ID)
    pub sub: AdminId,
    // Defaulted so a refresh token decodes far enough to fail the type check
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub iat: i64,
    pub exp: i64,
    pub token_type: TokenType,
    /// Unique per token, so two tokens minted in the same second differ
    pub jti: String,
}

/// Claims carried by a refresh token: identity only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: AdminId,
    pub iat: i64,
    pub exp: i64,
    pub token_type: TokenType,
    pub jti: String,
}

/// A freshly minted access/refresh pair
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKeys {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Mints and verifies the two token classes. Each class has its own secret.
#[derive(Clone)]
pub struct TokenService {
    access: std::sync::Arc<SigningKeys>,
    refresh: std::sync::Arc<SigningKeys>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access: std::sync::Arc::new(SigningKeys::from_secret(access_secret)),
            refresh: std::sync::Arc::new(SigningKeys::from_secret(refresh_secret)),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.access_token_secret,
            &config.refresh_token_secret,
            config.access_token_expiry,
            config.refresh_token_expiry,
        )
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Sign an access token carrying the admin's id, email and name
    pub fn issue_access_token(&self, admin: &Admin) -> Result<String, TokenError> {
        let now = OffsetDateTime::now_utc();
        let claims = AccessClaims {
            sub: admin.id,
            email: admin.email.clone(),
            name: admin.name.clone(),
            iat: now.unix_timestamp(),
            exp: expires_at(now, self.access_ttl)?,
            token_type: TokenType::Access,
            jti: Uuid::new_v4().to_string(),
        };
        sign(&claims, &self.access.encoding)
    }

    /// Sign a refresh token carrying only the admin's id
    pub fn issue_refresh_token(&self, admin_id: AdminId) -> Result<String, TokenError> {
        let now = OffsetDateTime::now_utc();
        let claims = RefreshClaims {
            sub: admin_id,
            iat: now.unix_timestamp(),
            exp: expires_at(now, self.refresh_ttl)?,
            token_type: TokenType::Refresh,
            jti: Uuid::new_v4().to_string(),
        };
        sign(&claims, &self.refresh.encoding)
    }

    pub fn issue_pair(&self, admin: &Admin) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue_access_token(admin)?,
            refresh_token: self.issue_refresh_token(admin.id)?,
        })
    }

    pub fn validate_access_token(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let claims: AccessClaims = verify(token, &self.access.decoding)?;
        if claims.token_type != TokenType::Access {
            return Err(TokenError::WrongTokenType);
        }
        Ok(claims)
    }

    pub fn validate_refresh_token(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        let claims: RefreshClaims = verify(token, &self.refresh.decoding)?;
        if claims.token_type != TokenType::Refresh {
            return Err(TokenError::WrongTokenType);
        }
        Ok(claims)
    }
}

fn sign<C: Serialize>(claims: &C, key: &EncodingKey) -> Result<String, TokenError> {
    // Explicit algorithm; never trust the header's `alg`
    encode(&Header::new(Algorithm::HS256), claims, key)
        .map_err(|e| TokenError::Encoding(e.to_string()))
}

fn verify<C: DeserializeOwned>(token: &str, key: &DecodingKey) -> Result<C, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = LEEWAY_SECS;

    decode::<C>(token, key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidToken
            | ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm => TokenError::Invalid,
            _ => TokenError::Validation(e.to_string()),
        })
}

/// Token failures. The variants exist for logging; clients only ever see
/// a generic 401.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token")]
    Invalid,
    #[error("Wrong token type")]
    WrongTokenType,
    #[error("Token lifetime out of range")]
    LifetimeOutOfRange,
    #[error("Token encoding failed: {0}")]
    Encoding(String),
    #[error("Token validation failed: {0}")]
    Validation(String),
}

fn expires_at(now: OffsetDateTime, ttl: Duration) -> Result<i64, TokenError> {
    now.checked_add(ttl)
        .map(OffsetDateTime::unix_timestamp)
        .ok_or(TokenError::LifetimeOutOfRange)
}

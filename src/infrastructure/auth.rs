//! Admin gate: password check, session tokens and the request extractor
//!
//! The engine never authenticates anyone. Handlers turn a bearer token into
//! a [`Session`] here and pass it into the mutating service calls.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;

use axum::{
    async_trait,
    extract::{FromRequestParts, Json},
    http::{request::Parts, StatusCode},
};
use serde_json::json;

use crate::domain::Session;
use crate::infrastructure::state::AppState;

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // username
    pub role: String,
    pub exp: usize,
}

#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    InvalidCredentials,
    InvalidToken(String),
    Internal(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
            AuthError::InvalidToken(msg) => write!(f, "Invalid or expired token: {}", msg),
            AuthError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| e.to_string())?
        .to_string();
    Ok(password_hash)
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, String> {
    let parsed_hash = PasswordHash::new(password_hash).map_err(|e| e.to_string())?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// A freshly opened admin session and the token that carries it
#[derive(Debug, Serialize)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    #[serde(skip)]
    pub session: Session,
}

/// Credentials and signing key for the single admin account
pub struct AdminGate {
    username: String,
    password_hash: String,
    jwt_secret: String,
    session_ttl: Duration,
}

impl AdminGate {
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        jwt_secret: impl Into<String>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            jwt_secret: jwt_secret.into(),
            session_ttl,
        }
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Check credentials and open a session starting at `now`
    pub fn login(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedSession, AuthError> {
        if username != self.username {
            return Err(AuthError::InvalidCredentials);
        }
        match verify_password(password, &self.password_hash) {
            Ok(true) => {}
            Ok(false) => return Err(AuthError::InvalidCredentials),
            Err(e) => return Err(AuthError::Internal(e)),
        }

        let session = Session::start(now, self.session_ttl);
        let claims = Claims {
            sub: username.to_owned(),
            role: ADMIN_ROLE.to_owned(),
            exp: session.expires_at.timestamp().max(0) as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(IssuedSession {
            token,
            expires_at: session.expires_at,
            session,
        })
    }

    /// Decode a token into the session it carries. Expiry is checked by the
    /// caller through `Session::is_active`, not here.
    pub fn session_from_token(&self, token: &str) -> Result<Session, AuthError> {
        let mut validation = Validation::default();
        validation.validate_exp = false;

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        if claims.role != ADMIN_ROLE || claims.sub != self.username {
            return Err(AuthError::InvalidToken("not an admin token".to_string()));
        }

        let expires_at = Utc
            .timestamp_opt(claims.exp as i64, 0)
            .single()
            .ok_or_else(|| AuthError::InvalidToken("bad expiry".to_string()))?;
        Ok(Session::admin_until(expires_at))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .ok_or((
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Missing Authorization header" })),
            ))?;

        let Some(token) = auth_header.strip_prefix("Bearer ") else {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid Authorization header format" })),
            ));
        };

        let session = state.gate.session_from_token(token).map_err(|_| {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid or expired token" })),
            )
        })?;

        if !session.is_active(Utc::now()) {
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Session expired" })),
            ));
        }
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> AdminGate {
        let hash = hash_password("s3nha").unwrap();
        AdminGate::new("admin", hash, "test-secret", Duration::minutes(30))
    }

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("abc").unwrap();
        assert!(verify_password("abc", &hash).unwrap());
        assert!(!verify_password("abd", &hash).unwrap());
    }

    #[test]
    fn test_login_rejects_wrong_credentials() {
        let gate = gate();
        let now = Utc::now();
        assert_eq!(
            gate.login("admin", "wrong", now).unwrap_err(),
            AuthError::InvalidCredentials
        );
        assert_eq!(
            gate.login("root", "s3nha", now).unwrap_err(),
            AuthError::InvalidCredentials
        );
    }

    #[test]
    fn test_token_carries_session_expiry() {
        let gate = gate();
        let now = Utc::now();
        let issued = gate.login("admin", "s3nha", now).unwrap();
        let session = gate.session_from_token(&issued.token).unwrap();

        assert!(session.authenticated);
        assert_eq!(session.expires_at.timestamp(), issued.expires_at.timestamp());
        assert!(session.is_active(now));
        assert!(!session.is_active(now + Duration::minutes(31)));
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let issued = gate().login("admin", "s3nha", Utc::now()).unwrap();
        let other = AdminGate::new("admin", "unused", "other-secret", Duration::minutes(30));
        assert!(matches!(
            other.session_from_token(&issued.token),
            Err(AuthError::InvalidToken(_))
        ));
    }
}

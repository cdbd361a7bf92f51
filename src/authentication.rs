use std::sync::Arc;

use crate::errors::RequestError;
use crate::AppContext;
use anyhow::{Context, Result};
use argon2::PasswordVerifier;
use argon2::{password_hash::SaltString, Argon2, PasswordHash};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

const JWT_EXPIRY_DURATION: time::Duration = time::Duration::days(90);

#[derive(Debug, Serialize, Deserialize)]
struct AuthClaim {
    id: i64,
    exp: i64,
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
}

/// The viewer of a public page, if they sent a valid token. A header that
/// is malformed or fails verification counts as anonymous.
pub struct MaybeUser(pub Option<AuthUser>);

/// The viewer of a protected page. Anonymous requests are rejected with a
/// redirect to the login page that comes back to the requested path.
pub struct LoginRequired(pub AuthUser);

impl MaybeUser {
    pub fn get_id(&self) -> Option<i64> {
        self.0.as_ref().map(|a| a.id)
    }
}

fn jwt_secret(parts: &Parts) -> Result<String, RequestError> {
    match parts.extensions.get::<Arc<AppContext>>() {
        Some(context) => Ok(context.config.jwt_secret.clone()),
        None => {
            tracing::error!("AppContext extension missing from request");
            Err(RequestError::ServerError)
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync + 'static,
{
    type Rejection = RequestError;
    async fn from_request_parts(
        parts: &mut Parts,
        _: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let header = match parts.headers.get("Authorization") {
            Some(header) => header,
            None => return Ok(MaybeUser(None)),
        };
        let header = match header.to_str() {
            Ok(header) => header,
            Err(_) => {
                tracing::warn!("Authorization header is not valid ASCII");
                return Ok(MaybeUser(None));
            }
        };

        let token = match header.strip_prefix("Token ") {
            Some(token) => token,
            None => {
                tracing::warn!("Authorization header without Token prefix");
                return Ok(MaybeUser(None));
            }
        };

        let secret = jwt_secret(parts)?;
        match verify_jwt_token(&secret, token) {
            Ok(id) => Ok(MaybeUser(Some(AuthUser { id }))),
            Err(_) => Ok(MaybeUser(None)),
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for LoginRequired
where
    S: Send + Sync + 'static,
{
    type Rejection = RequestError;
    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        match MaybeUser::from_request_parts(parts, state).await? {
            MaybeUser(Some(user)) => Ok(LoginRequired(user)),
            MaybeUser(None) => {
                let target = parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or_else(|| parts.uri.path());
                let next = match urlencoding::decode(target) {
                    Ok(decoded) => decoded.into_owned(),
                    Err(_) => target.to_owned(),
                };
                Err(RequestError::LoginRequired { next })
            }
        }
    }
}

pub fn get_jwt_token(secret: &str, id: i64) -> Result<String> {
    let expiry_date = OffsetDateTime::now_utc() + JWT_EXPIRY_DURATION;
    let claim = AuthClaim {
        id,
        exp: expiry_date.unix_timestamp(),
    };

    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claim,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_ref()),
    )
    .context("Failed to generate jwt token")
}

pub fn verify_jwt_token(secret: &str, token: &str) -> Result<i64, RequestError> {
    let token_data = jsonwebtoken::decode::<AuthClaim>(
        token,
        &jsonwebtoken::DecodingKey::from_secret(secret.as_ref()),
        &jsonwebtoken::Validation::default(),
    )
    .map_err(|e| {
        tracing::warn!(error = %e, "rejected token");
        RequestError::NotAuthorized("Invalid Token")
    })?;
    let claim = token_data.claims;
    if claim.exp < OffsetDateTime::now_utc().unix_timestamp() {
        tracing::warn!(user_id = claim.id, "expired token");
        return Err(RequestError::NotAuthorized("Token expired"));
    }
    Ok(claim.id)
}

pub async fn verify_password_argon2(password: String, hash: &str) -> Result<bool> {
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || {
        let hash = PasswordHash::new(hash.as_str())
            .map_err(|_| anyhow::anyhow!("Failed to verify password"))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok())
    })
    .await
    .context("Failed to verify password")?
}

pub async fn hash_password_argon2(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(rand::thread_rng());
        let hash = PasswordHash::generate(Argon2::default(), password, salt.as_salt())
            .map_err(|_| anyhow::anyhow!("Failed to hash password"))?;
        Ok(hash.to_string())
    })
    .await
    .context("Failed to hash password")?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let token = get_jwt_token("secret", 42).unwrap();
        assert_eq!(verify_jwt_token("secret", &token).unwrap(), 42);
    }

    #[test]
    fn test_token_with_wrong_secret_is_rejected() {
        let token = get_jwt_token("secret", 42).unwrap();
        assert!(matches!(
            verify_jwt_token("other", &token),
            Err(RequestError::NotAuthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_password_hash_verifies() {
        let hash = hash_password_argon2("hunter22".to_owned()).await.unwrap();
        assert!(verify_password_argon2("hunter22".to_owned(), &hash)
            .await
            .unwrap());
        assert!(!verify_password_argon2("hunter23".to_owned(), &hash)
            .await
            .unwrap());
    }
}

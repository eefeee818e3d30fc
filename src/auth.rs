// ABOUTME: JWT issuance and verification for TutorLink accounts
// ABOUTME: Turns a bearer token into an authenticated Requester via the account directory
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

//! # Authentication
//!
//! Tokens are HS256-signed with the configured secret. The `sub` claim is
//! always re-resolved through the directory so a token never outlives the
//! account it names.

use crate::config::AuthConfig;
use crate::constants::auth::{JWT_AUDIENCE, JWT_ISSUER};
use crate::directory::AccountDirectory;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{Account, AccountId, Requester};
use crate::utils::auth::bearer_from_headers;
use chrono::{Duration, Utc};
use http::HeaderMap;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// `JWT` claims carried by every access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account `ID`
    pub sub: String,
    /// Account email
    pub email: String,
    /// Account role at issue time
    pub role: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Audience
    pub aud: String,
    /// Issuer
    pub iss: String,
}

/// Issues and validates access tokens
#[derive(Clone)]
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
}

impl fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthManager")
            .field("token_expiry_hours", &self.token_expiry_hours)
            .finish_non_exhaustive()
    }
}

impl AuthManager {
    /// Create an authentication manager from the configured secret
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            token_expiry_hours: config.jwt_expiry_hours,
        }
    }

    /// Generate a `JWT` for `account`
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails
    pub fn generate_token(&self, account: &Account) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: account.id.to_string(),
            email: account.email.clone(),
            role: account.role.as_str().to_owned(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.token_expiry_hours)).timestamp(),
            aud: JWT_AUDIENCE.to_owned(),
            iss: JWT_ISSUER.to_owned(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign token: {e}")))
    }

    /// Validate a token and return its claims
    ///
    /// # Errors
    ///
    /// Returns `AuthExpired` for expired tokens and `AuthInvalid` for anything
    /// else that fails verification
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_audience(&[JWT_AUDIENCE]);
        validation.set_issuer(&[JWT_ISSUER]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::auth_expired(),
                _ => {
                    debug!(error = %e, "JWT validation failed");
                    AppError::auth_invalid(format!("Invalid token: {e}"))
                }
            })
    }

    /// Authenticate the `Authorization` header of a request
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` without a bearer token, `AuthInvalid`/`AuthExpired`
    /// for a bad token or an account that no longer exists
    pub async fn authenticate(
        &self,
        headers: &HeaderMap,
        directory: &dyn AccountDirectory,
    ) -> AppResult<Requester> {
        let token = bearer_from_headers(headers)?;
        let claims = self.validate_token(token).inspect_err(|e| {
            AppLogger::log_auth_event("unknown", "token_rejected", false);
            debug!(error = %e, "Rejected bearer token");
        })?;

        let id: AccountId = claims
            .sub
            .parse()
            .map_err(|_| AppError::auth_invalid("Token subject is not an account id"))?;

        let account = directory.find_by_id(id).await?.ok_or_else(|| {
            AppLogger::log_auth_event(&claims.sub, "account_missing", false);
            AppError::auth_invalid("Token subject no longer exists")
        })?;

        Ok(Requester::from(&account))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use crate::models::Role;

    fn config(secret: &str, hours: i64) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_owned(),
            jwt_expiry_hours: hours,
        }
    }

    fn account() -> Account {
        Account {
            id: AccountId::new(),
            role: Role::Teacher,
            email: "ada@example.com".to_owned(),
            display_name: "Ada".to_owned(),
            subjects: vec!["Physics".to_owned()],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_token_round_trip_keeps_subject_and_role() {
        let manager = AuthManager::new(&config("test-secret", 1));
        let account = account();
        let token = manager.generate_token(&account).unwrap();

        let claims = manager.validate_token(&token).unwrap();
        assert_eq!(claims.sub, account.id.to_string());
        assert_eq!(claims.role, "Teacher");
        assert_eq!(claims.aud, JWT_AUDIENCE);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let issuer = AuthManager::new(&config("secret-a", 1));
        let verifier = AuthManager::new(&config("secret-b", 1));
        let token = issuer.generate_token(&account()).unwrap();

        let err = verifier.validate_token(&token).unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthInvalid);
    }

    #[test]
    fn test_expired_token_is_reported_as_expired() {
        let manager = AuthManager::new(&config("test-secret", -2));
        let token = manager.generate_token(&account()).unwrap();

        let err = manager.validate_token(&token).unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthExpired);
    }
}

// ABOUTME: Bearer token extraction from Authorization headers
// ABOUTME: Shared by the auth manager and route handlers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

use crate::errors::{AppError, AppResult};
use axum::http::{header::AUTHORIZATION, HeaderMap};

/// Extract bearer token from Authorization header string
///
/// # Errors
///
/// Returns an error if the header is not `Bearer <token>` or the token is empty
pub fn extract_bearer_token(auth_header: &str) -> AppResult<&str> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::auth_invalid("Invalid authorization header format"))?
        .trim();

    if token.is_empty() {
        return Err(AppError::auth_invalid("Empty bearer token"));
    }

    Ok(token)
}

/// Extract the bearer token from request headers
///
/// # Errors
///
/// Returns `AuthRequired` when the header is missing and `AuthInvalid` when it is malformed
pub fn bearer_from_headers(headers: &HeaderMap) -> AppResult<&str> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(AppError::auth_required)?
        .to_str()
        .map_err(|_| AppError::auth_invalid("Authorization header is not valid UTF-8"))?;
    extract_bearer_token(header)
}

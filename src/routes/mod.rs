// ABOUTME: Route module organization for the TutorLink HTTP API
// ABOUTME: Domain route groups plus shared request parsing helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

//! HTTP routes
//!
//! Each domain exposes a `XRoutes::routes(resources)` constructor returning a
//! `Router` with its state already applied, merged together in `server`.
//! Handlers authenticate, parse, and delegate to the services.

/// Public site assistant
pub mod chatbot;
/// Conversations and messages
pub mod chats;
/// Connections and the subject catalog
pub mod directory;
/// Doubt lifecycle
pub mod doubts;
/// Health and readiness probes
pub mod health;

pub use chatbot::ChatbotRoutes;
pub use chats::ChatRoutes;
pub use directory::DirectoryRoutes;
pub use doubts::DoubtRoutes;
pub use health::HealthRoutes;

use crate::directory::AccountDirectory;
use crate::errors::{AppError, AppResult};
use crate::models::AccountId;
use axum::extract::rejection::JsonRejection;
use axum::Json;
use std::str::FromStr;

/// Unwrap a JSON body, reporting malformed bodies as validation errors
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::invalid_input(format!("Invalid request body: {}", rejection.body_text())))
}

/// Parse an id from a path segment; malformed ids name nothing, so they are 404s
pub(crate) fn path_id<T: FromStr>(raw: &str, resource: &str) -> AppResult<T> {
    raw.parse::<T>().map_err(|_| AppError::not_found(resource))
}

/// Normalize teacher references from a request body into account ids
///
/// A UUID string is taken as an id; a string containing `@` is looked up by
/// email. Role checks happen later in the services.
///
/// # Errors
///
/// Returns `InvalidInput` for references that are neither, or for an unknown email
pub(crate) async fn resolve_account_refs(
    directory: &dyn AccountDirectory,
    refs: &[String],
) -> AppResult<Vec<AccountId>> {
    let mut ids = Vec::with_capacity(refs.len());
    for reference in refs {
        let reference = reference.trim();
        if let Ok(id) = reference.parse::<AccountId>() {
            ids.push(id);
        } else if reference.contains('@') {
            let account = directory
                .find_by_email(reference)
                .await?
                .ok_or_else(|| AppError::invalid_input(format!("No account with email {reference}")))?;
            ids.push(account.id);
        } else {
            return Err(AppError::invalid_input(format!(
                "'{reference}' is neither an account id nor an email"
            )));
        }
    }
    Ok(ids)
}

// ABOUTME: Account directory contract used for identity and role lookups
// ABOUTME: SQLite-backed implementation plus role-checked resolution helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

//! # Account Directory
//!
//! Sign-up and credential storage live outside this service. Everything here
//! needs only to look accounts up by id, by email, or by role and subject.

use crate::database::AccountManager;
use crate::errors::{AppError, AppResult};
use crate::models::{Account, AccountId, Role};
use async_trait::async_trait;

/// Read-only view over registered accounts
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Look an account up by id
    async fn find_by_id(&self, id: AccountId) -> AppResult<Option<Account>>;

    /// Look an account up by email, ignoring case
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>>;

    /// Every account with `role`
    async fn find_by_role(&self, role: Role) -> AppResult<Vec<Account>>;

    /// Accounts with `role` that cover `subject`
    async fn find_by_role_and_subject(&self, role: Role, subject: &str) -> AppResult<Vec<Account>>;
}

#[async_trait]
impl AccountDirectory for AccountManager {
    async fn find_by_id(&self, id: AccountId) -> AppResult<Option<Account>> {
        self.get_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        self.get_by_email(email).await
    }

    async fn find_by_role(&self, role: Role) -> AppResult<Vec<Account>> {
        self.list_by_role(role).await
    }

    async fn find_by_role_and_subject(&self, role: Role, subject: &str) -> AppResult<Vec<Account>> {
        self.list_by_role_and_subject(role, subject).await
    }
}

/// Resolve `id` and require it to hold `role`
///
/// # Errors
///
/// Returns `RoleViolation` when the account is missing or has another role
pub async fn require_role(
    directory: &dyn AccountDirectory,
    id: AccountId,
    role: Role,
) -> AppResult<Account> {
    match directory.find_by_id(id).await? {
        Some(account) if account.role == role => Ok(account),
        Some(account) => Err(AppError::role_violation(format!(
            "Account {id} is a {}, expected a {role}",
            account.role
        ))),
        None => Err(AppError::role_violation(format!(
            "Account {id} does not resolve to a {role}"
        ))),
    }
}

/// Resolve every id in `ids` as a teacher, keeping order
///
/// # Errors
///
/// Returns `RoleViolation` on the first id that is not a teacher
pub async fn require_teachers(
    directory: &dyn AccountDirectory,
    ids: &[AccountId],
) -> AppResult<Vec<Account>> {
    let mut teachers = Vec::with_capacity(ids.len());
    for id in ids {
        teachers.push(require_role(directory, *id, Role::Teacher).await?);
    }
    Ok(teachers)
}

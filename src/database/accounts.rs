// ABOUTME: Database operations for student and teacher accounts
// ABOUTME: Stores role, case-insensitive email and the subjects a teacher covers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

use super::{parse_enum, parse_id, parse_timestamp};
use crate::errors::{AppError, AppResult, DatabaseError};
use crate::models::{Account, AccountId, Role};
use crate::utils::clock;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::collections::HashSet;

/// Input for registering an account
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Student or teacher
    pub role: Role,
    /// Unique email
    pub email: String,
    /// Name shown to other participants
    pub display_name: String,
    /// Subjects covered; ignored for students
    pub subjects: Vec<String>,
}

/// Account database operations manager
pub struct AccountManager {
    pool: SqlitePool,
}

impl AccountManager {
    /// Create a new account manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Register an account
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` if the email is taken, or a database error
    pub async fn create(&self, new_account: NewAccount) -> AppResult<Account> {
        let id = AccountId::new();
        let created_at = clock::now();
        let email = new_account.email.trim().to_owned();

        let mut subjects: Vec<String> = if new_account.role == Role::Teacher {
            new_account
                .subjects
                .iter()
                .map(|s| s.trim().to_owned())
                .filter(|s| !s.is_empty())
                .collect()
        } else {
            Vec::new()
        };
        let mut seen = HashSet::new();
        subjects.retain(|s| seen.insert(s.clone()));

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO accounts (id, email, display_name, role, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(id.to_string())
        .bind(&email)
        .bind(new_account.display_name.trim())
        .bind(new_account.role.as_str())
        .bind(clock::to_storage(&created_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            let err = DatabaseError::query("create account", e);
            if err.is_unique_violation() {
                AppError::already_exists(format!("An account with email {email} already exists"))
            } else {
                err.into()
            }
        })?;

        for subject in &subjects {
            sqlx::query(
                "INSERT OR IGNORE INTO teacher_subjects (account_id, subject) VALUES ($1, $2)",
            )
            .bind(id.to_string())
            .bind(subject)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to store teacher subject: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit account: {e}")))?;

        Ok(Account {
            id,
            role: new_account.role,
            email,
            display_name: new_account.display_name.trim().to_owned(),
            subjects,
            created_at,
        })
    }

    /// Look up an account by id
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get_by_id(&self, id: AccountId) -> AppResult<Option<Account>> {
        let row = sqlx::query(
            "SELECT id, email, display_name, role, created_at FROM accounts WHERE id = $1",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get account: {e}")))?;

        match row {
            Some(row) => Ok(Some(self.hydrate(&row).await?)),
            None => Ok(None),
        }
    }

    /// Look up an account by email, ignoring case
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let row = sqlx::query(
            "SELECT id, email, display_name, role, created_at FROM accounts WHERE email = $1",
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get account by email: {e}")))?;

        match row {
            Some(row) => Ok(Some(self.hydrate(&row).await?)),
            None => Ok(None),
        }
    }

    /// All accounts with `role`, ordered by display name
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_by_role(&self, role: Role) -> AppResult<Vec<Account>> {
        let rows = sqlx::query(
            r"
            SELECT id, email, display_name, role, created_at
            FROM accounts
            WHERE role = $1
            ORDER BY display_name
            ",
        )
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list accounts by role: {e}")))?;

        let mut accounts = Vec::with_capacity(rows.len());
        for row in &rows {
            accounts.push(self.hydrate(row).await?);
        }
        Ok(accounts)
    }

    /// Accounts with `role` that cover `subject`
    ///
    /// Students never have subjects, so asking for students yields nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_by_role_and_subject(
        &self,
        role: Role,
        subject: &str,
    ) -> AppResult<Vec<Account>> {
        let rows = sqlx::query(
            r"
            SELECT a.id, a.email, a.display_name, a.role, a.created_at
            FROM accounts a
            JOIN teacher_subjects s ON s.account_id = a.id
            WHERE a.role = $1 AND s.subject = $2
            ORDER BY a.display_name
            ",
        )
        .bind(role.as_str())
        .bind(subject.trim())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list accounts by subject: {e}")))?;

        let mut accounts = Vec::with_capacity(rows.len());
        for row in &rows {
            accounts.push(self.hydrate(row).await?);
        }
        Ok(accounts)
    }

    async fn hydrate(&self, row: &SqliteRow) -> AppResult<Account> {
        let id: AccountId = parse_id("accounts.id", row.get("id"))?;
        let role: Role = parse_enum("accounts.role", row.get("role"))?;

        let subjects = if role == Role::Teacher {
            sqlx::query_scalar::<_, String>(
                "SELECT subject FROM teacher_subjects WHERE account_id = $1 ORDER BY rowid",
            )
            .bind(id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to load teacher subjects: {e}")))?
        } else {
            Vec::new()
        };

        Ok(Account {
            id,
            role,
            email: row.get("email"),
            display_name: row.get("display_name"),
            subjects,
            created_at: parse_timestamp("accounts.created_at", row.get("created_at"))?,
        })
    }
}

// ABOUTME: SQLite database management: pool setup, migrations and per-domain managers
// ABOUTME: Owns the schema for accounts, doubts, conversations, messages and connections
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

//! # Database Management
//!
//! All persistence goes through a single `SqlitePool`. Each domain has a
//! lightweight manager (`AccountManager`, `DoubtManager`, `ChatManager`,
//! `ConnectionManager`) that borrows a clone of the pool.

/// Account and teacher subject storage
pub mod accounts;
/// Conversation and message storage
pub mod chat;
/// Teacher/student connection index
pub mod connections;
/// Doubt storage
pub mod doubts;

pub use accounts::{AccountManager, NewAccount};
pub use chat::{ChatManager, TeacherAddition};
pub use connections::ConnectionManager;
pub use doubts::DoubtManager;

use crate::config::DatabaseUrl;
use crate::errors::{AppError, AppResult, DatabaseError};
use crate::utils::clock;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

const BUSY_TIMEOUT_SECS: u64 = 5;
const MAX_CONNECTIONS: u32 = 8;

/// Database manager for all TutorLink storage
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) and migrate the database
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or a migration fails
    pub async fn new(url: &DatabaseUrl) -> AppResult<Self> {
        if let DatabaseUrl::SQLite { path } = url {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::database(format!(
                        "Failed to create database directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }

        let options = SqliteConnectOptions::from_str(&url.to_connection_string())
            .map_err(|e| AppError::config(format!("Invalid database URL: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(BUSY_TIMEOUT_SECS));

        // Every connection to :memory: is a separate database, and closing the
        // only one drops all data, so it is pinned open for the pool's lifetime
        let (options, pool_options) = if url.is_memory() {
            (
                options,
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None),
            )
        } else {
            (
                options.journal_mode(SqliteJournalMode::Wal),
                SqlitePoolOptions::new().max_connections(MAX_CONNECTIONS),
            )
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect to database: {e}")))?;

        let db = Self { pool };
        db.migrate().await?;

        info!(database = %url.to_connection_string(), "Database ready");
        Ok(db)
    }

    /// Fresh in-memory database, migrated
    ///
    /// # Errors
    ///
    /// Returns an error if a migration fails
    pub async fn in_memory() -> AppResult<Self> {
        Self::new(&DatabaseUrl::Memory).await
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Account storage
    #[must_use]
    pub fn accounts(&self) -> AccountManager {
        AccountManager::new(self.pool.clone())
    }

    /// Doubt storage
    #[must_use]
    pub fn doubts(&self) -> DoubtManager {
        DoubtManager::new(self.pool.clone())
    }

    /// Conversation and message storage
    #[must_use]
    pub fn chats(&self) -> ChatManager {
        ChatManager::new(self.pool.clone())
    }

    /// Connection index storage
    #[must_use]
    pub fn connections(&self) -> ConnectionManager {
        ConnectionManager::new(self.pool.clone())
    }

    /// Cheap round-trip used by the readiness probe
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable
    pub async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Database health check failed: {e}")))?;
        Ok(())
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;
        }
        Ok(())
    }
}

const SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS accounts (
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL UNIQUE COLLATE NOCASE,
        display_name TEXT NOT NULL,
        role TEXT NOT NULL CHECK (role IN ('Student', 'Teacher')),
        created_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS teacher_subjects (
        account_id TEXT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
        subject TEXT NOT NULL,
        PRIMARY KEY (account_id, subject)
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_teacher_subjects_subject ON teacher_subjects(subject)",
    r"
    CREATE TABLE IF NOT EXISTS conversations (
        id TEXT PRIMARY KEY,
        display_name TEXT NOT NULL,
        student_id TEXT NOT NULL REFERENCES accounts(id),
        participant_key TEXT NOT NULL UNIQUE,
        latest_message_id TEXT,
        reuse_count INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_conversations_student ON conversations(student_id)",
    r"
    CREATE TABLE IF NOT EXISTS conversation_teachers (
        conversation_id TEXT NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
        teacher_id TEXT NOT NULL REFERENCES accounts(id),
        PRIMARY KEY (conversation_id, teacher_id)
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_conversation_teachers_teacher ON conversation_teachers(teacher_id)",
    r"
    CREATE TABLE IF NOT EXISTS messages (
        id TEXT PRIMARY KEY,
        conversation_id TEXT NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
        sender_id TEXT NOT NULL REFERENCES accounts(id),
        content TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_messages_conversation ON messages(conversation_id, created_at)",
    r"
    CREATE TABLE IF NOT EXISTS doubts (
        id TEXT PRIMARY KEY,
        subject TEXT NOT NULL,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('pending', 'answered', 'resolved')),
        student_id TEXT NOT NULL REFERENCES accounts(id),
        conversation_id TEXT REFERENCES conversations(id) ON DELETE SET NULL,
        ai_reply TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_doubts_student ON doubts(student_id)",
    "CREATE INDEX IF NOT EXISTS idx_doubts_subject ON doubts(subject)",
    r"
    CREATE TABLE IF NOT EXISTS doubt_teachers (
        doubt_id TEXT NOT NULL REFERENCES doubts(id) ON DELETE CASCADE,
        teacher_id TEXT NOT NULL REFERENCES accounts(id),
        added_at TEXT NOT NULL,
        PRIMARY KEY (doubt_id, teacher_id)
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_doubt_teachers_teacher ON doubt_teachers(teacher_id)",
    r"
    CREATE TABLE IF NOT EXISTS teacher_connections (
        teacher_id TEXT NOT NULL REFERENCES accounts(id),
        student_id TEXT NOT NULL REFERENCES accounts(id),
        connected_at TEXT NOT NULL,
        PRIMARY KEY (teacher_id, student_id)
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_teacher_connections_student ON teacher_connections(student_id)",
];

// ============================================================================
// Row decoding helpers shared by the managers
// ============================================================================

pub(crate) fn parse_id<T: FromStr>(field: &'static str, value: &str) -> AppResult<T> {
    value.parse::<T>().map_err(|_| {
        DatabaseError::InvalidData {
            field,
            reason: format!("'{value}' is not a valid identifier"),
        }
        .into()
    })
}

pub(crate) fn parse_timestamp(field: &'static str, value: &str) -> AppResult<DateTime<Utc>> {
    clock::from_storage(value).map_err(|e| {
        DatabaseError::InvalidData {
            field,
            reason: e.to_string(),
        }
        .into()
    })
}

pub(crate) fn parse_enum<T: FromStr<Err = String>>(field: &'static str, value: &str) -> AppResult<T> {
    value
        .parse::<T>()
        .map_err(|reason| DatabaseError::InvalidData { field, reason }.into())
}

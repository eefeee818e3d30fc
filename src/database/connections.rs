// ABOUTME: Database operations for the derived teacher/student connection index
// ABOUTME: Idempotent inserts and both-direction listing of connected accounts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

use super::{parse_id, parse_timestamp};
use crate::errors::{AppError, AppResult};
use crate::models::{AccountId, Connection};
use crate::utils::clock;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Connection index operations manager
pub struct ConnectionManager {
    pool: SqlitePool,
}

impl ConnectionManager {
    /// Create a new connection manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record that `teacher` is connected to `student`
    ///
    /// Returns `false` when the pair was already connected.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn connect(&self, teacher: AccountId, student: AccountId) -> AppResult<bool> {
        let inserted = sqlx::query(
            r"
            INSERT OR IGNORE INTO teacher_connections (teacher_id, student_id, connected_at)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(teacher.to_string())
        .bind(student.to_string())
        .bind(clock::to_storage(&clock::now()))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to record connection: {e}")))?
        .rows_affected();

        Ok(inserted > 0)
    }

    /// Students connected to `teacher`, oldest connection first
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn students_of(&self, teacher: AccountId) -> AppResult<Vec<Connection>> {
        let rows = sqlx::query(
            r"
            SELECT teacher_id, student_id, connected_at FROM teacher_connections
            WHERE teacher_id = $1
            ORDER BY connected_at, rowid
            ",
        )
        .bind(teacher.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list connected students: {e}")))?;

        rows.iter().map(row_to_connection).collect()
    }

    /// Teachers connected to `student`, oldest connection first
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn teachers_of(&self, student: AccountId) -> AppResult<Vec<Connection>> {
        let rows = sqlx::query(
            r"
            SELECT teacher_id, student_id, connected_at FROM teacher_connections
            WHERE student_id = $1
            ORDER BY connected_at, rowid
            ",
        )
        .bind(student.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list connected teachers: {e}")))?;

        rows.iter().map(row_to_connection).collect()
    }
}

fn row_to_connection(row: &SqliteRow) -> AppResult<Connection> {
    Ok(Connection {
        teacher: parse_id("teacher_connections.teacher_id", row.get("teacher_id"))?,
        student: parse_id("teacher_connections.student_id", row.get("student_id"))?,
        connected_at: parse_timestamp("teacher_connections.connected_at", row.get("connected_at"))?,
    })
}

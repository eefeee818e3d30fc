// ABOUTME: Database operations for doubts and their assigned teachers
// ABOUTME: Union-only teacher sets, compare-and-set conversation links and one-shot AI replies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

use super::{parse_enum, parse_id, parse_timestamp};
use crate::errors::{AppError, AppResult};
use crate::models::{AccountId, ConversationId, Doubt, DoubtId, DoubtStatus, NewDoubt};
use crate::utils::clock;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

const DOUBT_COLUMNS: &str = "d.id, d.subject, d.title, d.description, d.status, d.student_id, \
                             d.conversation_id, d.ai_reply, d.created_at, d.updated_at";

/// Doubt database operations manager
pub struct DoubtManager {
    pool: SqlitePool,
}

impl DoubtManager {
    /// Create a new doubt manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a new doubt with its initial teachers
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn create(&self, student: AccountId, new_doubt: &NewDoubt) -> AppResult<Doubt> {
        let id = DoubtId::new();
        let now = clock::now();
        let now_str = clock::to_storage(&now);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query(
            r"
            INSERT INTO doubts (id, subject, title, description, status, student_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            ",
        )
        .bind(id.to_string())
        .bind(&new_doubt.subject)
        .bind(&new_doubt.title)
        .bind(&new_doubt.description)
        .bind(DoubtStatus::Pending.as_str())
        .bind(student.to_string())
        .bind(&now_str)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to create doubt: {e}")))?;

        let mut teachers = Vec::with_capacity(new_doubt.teachers.len());
        for teacher in &new_doubt.teachers {
            let inserted = sqlx::query(
                "INSERT OR IGNORE INTO doubt_teachers (doubt_id, teacher_id, added_at) VALUES ($1, $2, $3)",
            )
            .bind(id.to_string())
            .bind(teacher.to_string())
            .bind(&now_str)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to assign doubt teacher: {e}")))?
            .rows_affected();
            if inserted > 0 {
                teachers.push(*teacher);
            }
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit doubt: {e}")))?;

        Ok(Doubt {
            id,
            subject: new_doubt.subject.clone(),
            title: new_doubt.title.clone(),
            description: new_doubt.description.clone(),
            status: DoubtStatus::Pending,
            student,
            teachers,
            conversation: None,
            ai_reply: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a doubt by id
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get(&self, id: DoubtId) -> AppResult<Option<Doubt>> {
        let row = sqlx::query(&format!("SELECT {DOUBT_COLUMNS} FROM doubts d WHERE d.id = $1"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get doubt: {e}")))?;

        match row {
            Some(row) => Ok(Some(self.hydrate(&row).await?)),
            None => Ok(None),
        }
    }

    /// Doubts raised by `student`, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_for_student(&self, student: AccountId) -> AppResult<Vec<Doubt>> {
        let rows = sqlx::query(&format!(
            "SELECT {DOUBT_COLUMNS} FROM doubts d WHERE d.student_id = $1 \
             ORDER BY d.created_at DESC, d.rowid DESC"
        ))
        .bind(student.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list student doubts: {e}")))?;

        self.hydrate_all(&rows).await
    }

    /// Doubts that list `teacher` among their teachers, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_for_teacher(&self, teacher: AccountId) -> AppResult<Vec<Doubt>> {
        let rows = sqlx::query(&format!(
            "SELECT {DOUBT_COLUMNS} FROM doubts d \
             JOIN doubt_teachers t ON t.doubt_id = d.id \
             WHERE t.teacher_id = $1 \
             ORDER BY d.created_at DESC, d.rowid DESC"
        ))
        .bind(teacher.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list teacher doubts: {e}")))?;

        self.hydrate_all(&rows).await
    }

    /// Doubts with no teacher whose subject is one of `subjects`, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_unassigned(&self, subjects: &[String]) -> AppResult<Vec<Doubt>> {
        if subjects.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = (1..=subjects.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {DOUBT_COLUMNS} FROM doubts d \
             WHERE d.subject IN ({placeholders}) \
             AND NOT EXISTS (SELECT 1 FROM doubt_teachers t WHERE t.doubt_id = d.id) \
             ORDER BY d.created_at DESC, d.rowid DESC"
        );

        let mut query = sqlx::query(&sql);
        for subject in subjects {
            query = query.bind(subject.as_str());
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list unassigned doubts: {e}")))?;

        self.hydrate_all(&rows).await
    }

    /// Add a teacher to the doubt's teacher set
    ///
    /// Returns `false` if the teacher was already present.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn add_teacher(&self, id: DoubtId, teacher: AccountId) -> AppResult<bool> {
        let now = clock::to_storage(&clock::now());
        let inserted = sqlx::query(
            "INSERT OR IGNORE INTO doubt_teachers (doubt_id, teacher_id, added_at) VALUES ($1, $2, $3)",
        )
        .bind(id.to_string())
        .bind(teacher.to_string())
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to add doubt teacher: {e}")))?
        .rows_affected()
            > 0;

        if inserted {
            self.touch(id, &now).await?;
        }
        Ok(inserted)
    }

    /// Link a conversation to a doubt that has none yet
    ///
    /// Returns `false` when another conversation was linked first.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn link_conversation(
        &self,
        id: DoubtId,
        conversation: ConversationId,
    ) -> AppResult<bool> {
        let linked = sqlx::query(
            r"
            UPDATE doubts SET conversation_id = $1, updated_at = $2
            WHERE id = $3 AND conversation_id IS NULL
            ",
        )
        .bind(conversation.to_string())
        .bind(clock::to_storage(&clock::now()))
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to link doubt conversation: {e}")))?
        .rows_affected();

        Ok(linked > 0)
    }

    /// Move a doubt's link from `from` to `to` if it still points at `from`
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn relink_conversation(
        &self,
        id: DoubtId,
        from: ConversationId,
        to: ConversationId,
    ) -> AppResult<bool> {
        let moved = sqlx::query(
            r"
            UPDATE doubts SET conversation_id = $1, updated_at = $2
            WHERE id = $3 AND conversation_id = $4
            ",
        )
        .bind(to.to_string())
        .bind(clock::to_storage(&clock::now()))
        .bind(id.to_string())
        .bind(from.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to relink doubt conversation: {e}")))?
        .rows_affected();

        Ok(moved > 0)
    }

    /// Store the generated explanation unless one is already present
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn set_ai_reply(&self, id: DoubtId, reply: &str) -> AppResult<bool> {
        let updated = sqlx::query(
            r"
            UPDATE doubts SET ai_reply = $1, updated_at = $2
            WHERE id = $3 AND ai_reply IS NULL
            ",
        )
        .bind(reply)
        .bind(clock::to_storage(&clock::now()))
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to store AI reply: {e}")))?
        .rows_affected();

        Ok(updated > 0)
    }

    async fn touch(&self, id: DoubtId, now: &str) -> AppResult<()> {
        sqlx::query("UPDATE doubts SET updated_at = $1 WHERE id = $2")
            .bind(now)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update doubt timestamp: {e}")))?;
        Ok(())
    }

    async fn teachers_of(&self, id: &str) -> AppResult<Vec<AccountId>> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT teacher_id FROM doubt_teachers WHERE doubt_id = $1 ORDER BY added_at, rowid",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load doubt teachers: {e}")))?;

        ids.iter()
            .map(|teacher| parse_id("doubt_teachers.teacher_id", teacher))
            .collect()
    }

    async fn hydrate_all(&self, rows: &[SqliteRow]) -> AppResult<Vec<Doubt>> {
        let mut doubts = Vec::with_capacity(rows.len());
        for row in rows {
            doubts.push(self.hydrate(row).await?);
        }
        Ok(doubts)
    }

    async fn hydrate(&self, row: &SqliteRow) -> AppResult<Doubt> {
        let raw_id: &str = row.get("id");
        let conversation: Option<&str> = row.get("conversation_id");

        Ok(Doubt {
            id: parse_id("doubts.id", raw_id)?,
            subject: row.get("subject"),
            title: row.get("title"),
            description: row.get("description"),
            status: parse_enum("doubts.status", row.get("status"))?,
            student: parse_id("doubts.student_id", row.get("student_id"))?,
            teachers: self.teachers_of(raw_id).await?,
            conversation: conversation
                .map(|c| parse_id("doubts.conversation_id", c))
                .transpose()?,
            ai_reply: row.get("ai_reply"),
            created_at: parse_timestamp("doubts.created_at", row.get("created_at"))?,
            updated_at: parse_timestamp("doubts.updated_at", row.get("updated_at"))?,
        })
    }
}

// ABOUTME: Database operations for teacher/student conversations and their messages
// ABOUTME: Enforces one conversation per participant set through a unique participant key
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

use super::{parse_id, parse_timestamp};
use crate::errors::{AppError, AppResult, DatabaseError};
use crate::models::{
    participant_key, AccountId, Conversation, ConversationId, Message, MessageId,
    RegisteredConversation,
};
use crate::utils::clock;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

const CONVERSATION_COLUMNS: &str =
    "c.id, c.display_name, c.student_id, c.latest_message_id, c.created_at, c.updated_at";

/// Concurrent teacher additions retry this many times before giving up
const ADD_TEACHER_ATTEMPTS: usize = 5;

/// Insert-or-claim rounds when a deduplicated conversation is discarded concurrently
const CREATE_ATTEMPTS: usize = 3;

/// Outcome of adding a teacher to a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeacherAddition {
    /// Teacher appended
    Added,
    /// Teacher was already a member
    AlreadyPresent,
    /// Another conversation already holds the resulting participant set
    Collided(ConversationId),
}

// ============================================================================
// Chat Manager
// ============================================================================

/// Chat database operations manager
pub struct ChatManager {
    pool: SqlitePool,
}

impl ChatManager {
    /// Create a new chat manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ========================================================================
    // Conversation Operations
    // ========================================================================

    /// Create a conversation, or return the one that already has this participant set
    ///
    /// `teachers` must be non-empty; duplicates are dropped keeping first occurrence.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn create_conversation(
        &self,
        student: AccountId,
        teachers: &[AccountId],
        display_name: &str,
    ) -> AppResult<RegisteredConversation> {
        let mut ordered: Vec<AccountId> = Vec::with_capacity(teachers.len());
        for teacher in teachers {
            if !ordered.contains(teacher) {
                ordered.push(*teacher);
            }
        }

        let key = participant_key(student, &ordered);

        for _ in 0..CREATE_ATTEMPTS {
            if let Some(conversation) = self.insert_conversation(student, &ordered, &key, display_name).await? {
                return Ok(RegisteredConversation {
                    conversation,
                    created: true,
                });
            }

            // The existing conversation may be discarded between our insert and this claim
            if let Some(existing) = self.claim_by_participant_key(&key).await? {
                debug!(participant_key = %key, "Reusing existing conversation");
                return Ok(RegisteredConversation {
                    conversation: existing,
                    created: false,
                });
            }
        }

        Err(AppError::internal(format!(
            "Could not create or reuse conversation {key} after {CREATE_ATTEMPTS} attempts"
        )))
    }

    /// Insert a conversation unless the participant key is taken
    async fn insert_conversation(
        &self,
        student: AccountId,
        teachers: &[AccountId],
        key: &str,
        display_name: &str,
    ) -> AppResult<Option<Conversation>> {
        let id = ConversationId::new();
        let now = clock::now();
        let now_str = clock::to_storage(&now);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let inserted = sqlx::query(
            r"
            INSERT INTO conversations (id, display_name, student_id, participant_key, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            ON CONFLICT(participant_key) DO NOTHING
            ",
        )
        .bind(id.to_string())
        .bind(display_name)
        .bind(student.to_string())
        .bind(key)
        .bind(&now_str)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to create conversation: {e}")))?
        .rows_affected();

        if inserted == 0 {
            tx.rollback()
                .await
                .map_err(|e| AppError::database(format!("Failed to roll back: {e}")))?;
            return Ok(None);
        }

        for teacher in teachers {
            sqlx::query(
                "INSERT INTO conversation_teachers (conversation_id, teacher_id) VALUES ($1, $2)",
            )
            .bind(id.to_string())
            .bind(teacher.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to add conversation teacher: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit conversation: {e}")))?;

        Ok(Some(Conversation {
            id,
            display_name: display_name.to_owned(),
            student,
            teachers: teachers.to_vec(),
            latest_message: None,
            created_at: now,
            updated_at: now,
        }))
    }

    /// Mark the conversation holding this participant set as reused and return it
    ///
    /// A claimed conversation is never discarded by `delete_if_unused`.
    async fn claim_by_participant_key(&self, key: &str) -> AppResult<Option<Conversation>> {
        let claimed = sqlx::query_scalar::<_, String>(
            r"
            UPDATE conversations SET reuse_count = reuse_count + 1
            WHERE participant_key = $1
            RETURNING id
            ",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to claim conversation: {e}")))?;

        match claimed {
            Some(raw_id) => {
                let id: ConversationId = parse_id("conversations.id", &raw_id)?;
                self.get_conversation(id).await
            }
            None => Ok(None),
        }
    }

    /// Get a conversation by id
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get_conversation(&self, id: ConversationId) -> AppResult<Option<Conversation>> {
        let row = sqlx::query(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations c WHERE c.id = $1"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get conversation: {e}")))?;

        match row {
            Some(row) => Ok(Some(self.hydrate(&row).await?)),
            None => Ok(None),
        }
    }

    /// Conversations `account` participates in, most recently updated first
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_for_account(&self, account: AccountId) -> AppResult<Vec<Conversation>> {
        let rows = sqlx::query(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations c \
             WHERE c.student_id = $1 \
             OR EXISTS (SELECT 1 FROM conversation_teachers t \
                        WHERE t.conversation_id = c.id AND t.teacher_id = $1) \
             ORDER BY c.updated_at DESC, c.rowid DESC"
        ))
        .bind(account.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list conversations: {e}")))?;

        let mut conversations = Vec::with_capacity(rows.len());
        for row in &rows {
            conversations.push(self.hydrate(row).await?);
        }
        Ok(conversations)
    }

    /// Append a teacher to a conversation's teacher set
    ///
    /// The participant key is swapped with a compare-and-set so concurrent
    /// additions to the same conversation never lose one another.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the conversation does not exist, or a database error
    pub async fn add_teacher(
        &self,
        id: ConversationId,
        teacher: AccountId,
    ) -> AppResult<TeacherAddition> {
        for _ in 0..ADD_TEACHER_ATTEMPTS {
            let conversation = self
                .get_conversation(id)
                .await?
                .ok_or_else(|| AppError::not_found("Conversation"))?;

            if conversation.teachers.contains(&teacher) {
                return Ok(TeacherAddition::AlreadyPresent);
            }

            let old_key = conversation.participant_key();
            let mut teachers = conversation.teachers.clone();
            teachers.push(teacher);
            let new_key = participant_key(conversation.student, &teachers);

            match self.swap_teachers(id, teacher, &old_key, &new_key).await? {
                SwapResult::Swapped => return Ok(TeacherAddition::Added),
                SwapResult::Collided => {
                    if let Some(existing) = self.claim_by_participant_key(&new_key).await? {
                        return Ok(TeacherAddition::Collided(existing.id));
                    }
                    debug!(conversation_id = %id, "Colliding conversation vanished, retrying");
                }
                SwapResult::Stale => {
                    debug!(conversation_id = %id, "Participant set changed concurrently, retrying");
                }
            }
        }

        Err(AppError::internal(format!(
            "Could not add teacher to conversation {id} after {ADD_TEACHER_ATTEMPTS} attempts"
        )))
    }

    async fn swap_teachers(
        &self,
        id: ConversationId,
        teacher: AccountId,
        old_key: &str,
        new_key: &str,
    ) -> AppResult<SwapResult> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let swapped = sqlx::query(
            r"
            UPDATE conversations SET participant_key = $1, updated_at = MAX(updated_at, $2)
            WHERE id = $3 AND participant_key = $4
            ",
        )
        .bind(new_key)
        .bind(clock::to_storage(&clock::now()))
        .bind(id.to_string())
        .bind(old_key)
        .execute(&mut *tx)
        .await;

        let rows = match swapped {
            Ok(result) => result.rows_affected(),
            Err(e) => {
                let err = DatabaseError::query("swap participant key", e);
                tx.rollback()
                    .await
                    .map_err(|e| AppError::database(format!("Failed to roll back: {e}")))?;
                if err.is_unique_violation() {
                    return Ok(SwapResult::Collided);
                }
                return Err(err.into());
            }
        };

        if rows == 0 {
            tx.rollback()
                .await
                .map_err(|e| AppError::database(format!("Failed to roll back: {e}")))?;
            return Ok(SwapResult::Stale);
        }

        sqlx::query(
            "INSERT OR IGNORE INTO conversation_teachers (conversation_id, teacher_id) VALUES ($1, $2)",
        )
        .bind(id.to_string())
        .bind(teacher.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to add conversation teacher: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit teacher addition: {e}")))?;

        Ok(SwapResult::Swapped)
    }

    /// Delete a conversation, its messages and any doubt link to it
    ///
    /// Returns `false` if the conversation did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn delete_conversation(&self, id: ConversationId) -> AppResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        sqlx::query("UPDATE doubts SET conversation_id = NULL WHERE conversation_id = $1")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to unlink doubts: {e}")))?;

        sqlx::query("DELETE FROM messages WHERE conversation_id = $1")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete messages: {e}")))?;

        sqlx::query("DELETE FROM conversation_teachers WHERE conversation_id = $1")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete conversation teachers: {e}")))?;

        let deleted = sqlx::query("DELETE FROM conversations WHERE id = $1")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete conversation: {e}")))?
            .rows_affected();

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit deletion: {e}")))?;

        Ok(deleted > 0)
    }

    /// Delete a conversation only if nothing refers to it yet
    ///
    /// Used to discard a conversation created by the losing side of a race.
    /// Conversations handed out through deduplication or a collision have been
    /// claimed and are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn delete_if_unused(&self, id: ConversationId) -> AppResult<bool> {
        let deleted = sqlx::query(
            r"
            DELETE FROM conversations
            WHERE id = $1
              AND latest_message_id IS NULL
              AND reuse_count = 0
              AND NOT EXISTS (SELECT 1 FROM doubts WHERE conversation_id = $1)
            ",
        )
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to discard conversation: {e}")))?
        .rows_affected();

        Ok(deleted > 0)
    }

    // ========================================================================
    // Message Operations
    // ========================================================================

    /// Append a message and make it the conversation's latest
    ///
    /// The timestamp is taken while holding the write lock, so timestamp order,
    /// commit order and `latest_message_id` always agree.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the conversation was deleted concurrently, or a database error
    pub async fn add_message(
        &self,
        conversation: ConversationId,
        sender: AccountId,
        content: &str,
    ) -> AppResult<Message> {
        let id = MessageId::new();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        // First statement is a write: takes the write lock before reading the clock
        let present = sqlx::query("UPDATE conversations SET updated_at = updated_at WHERE id = $1")
            .bind(conversation.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to lock conversation: {e}")))?
            .rows_affected();

        if present == 0 {
            tx.rollback()
                .await
                .map_err(|e| AppError::database(format!("Failed to roll back: {e}")))?;
            return Err(AppError::not_found("Conversation"));
        }

        let created_at = clock::now();
        let now_str = clock::to_storage(&created_at);

        sqlx::query(
            r"
            INSERT INTO messages (id, conversation_id, sender_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(id.to_string())
        .bind(conversation.to_string())
        .bind(sender.to_string())
        .bind(content)
        .bind(&now_str)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to add message: {e}")))?;

        sqlx::query(
            r"
            UPDATE conversations SET latest_message_id = $1, updated_at = MAX(updated_at, $2)
            WHERE id = $3
            ",
        )
        .bind(id.to_string())
        .bind(&now_str)
        .bind(conversation.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to update conversation: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit message: {e}")))?;

        Ok(Message {
            id,
            conversation,
            sender,
            content: content.to_owned(),
            created_at,
        })
    }

    /// Messages of a conversation, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get_messages(&self, conversation: ConversationId) -> AppResult<Vec<Message>> {
        let rows = sqlx::query(
            r"
            SELECT id, conversation_id, sender_id, content, created_at
            FROM messages
            WHERE conversation_id = $1
            ORDER BY rowid ASC
            ",
        )
        .bind(conversation.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get messages: {e}")))?;

        rows.iter()
            .map(|row| -> AppResult<Message> {
                Ok(Message {
                    id: parse_id("messages.id", row.get("id"))?,
                    conversation: parse_id("messages.conversation_id", row.get("conversation_id"))?,
                    sender: parse_id("messages.sender_id", row.get("sender_id"))?,
                    content: row.get("content"),
                    created_at: parse_timestamp("messages.created_at", row.get("created_at"))?,
                })
            })
            .collect()
    }

    /// Number of messages stored for a conversation
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn count_messages(&self, conversation: ConversationId) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM messages WHERE conversation_id = $1")
            .bind(conversation.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count messages: {e}")))
    }

    async fn hydrate(&self, row: &SqliteRow) -> AppResult<Conversation> {
        let raw_id: &str = row.get("id");
        let latest: Option<&str> = row.get("latest_message_id");

        let teacher_ids = sqlx::query_scalar::<_, String>(
            "SELECT teacher_id FROM conversation_teachers WHERE conversation_id = $1 ORDER BY rowid",
        )
        .bind(raw_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load conversation teachers: {e}")))?;

        Ok(Conversation {
            id: parse_id("conversations.id", raw_id)?,
            display_name: row.get("display_name"),
            student: parse_id("conversations.student_id", row.get("student_id"))?,
            teachers: teacher_ids
                .iter()
                .map(|t| parse_id("conversation_teachers.teacher_id", t))
                .collect::<AppResult<Vec<_>>>()?,
            latest_message: latest
                .map(|m| parse_id("conversations.latest_message_id", m))
                .transpose()?,
            created_at: parse_timestamp("conversations.created_at", row.get("created_at"))?,
            updated_at: parse_timestamp("conversations.updated_at", row.get("updated_at"))?,
        })
    }
}

enum SwapResult {
    Swapped,
    Collided,
    Stale,
}

// ABOUTME: Conversation registry enforcing participant roles, dedup and membership
// ABOUTME: Wraps chat storage with directory checks and connection graph updates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

//! # Conversation Registry
//!
//! A conversation has exactly one student and one or more teachers. The
//! `(student, sorted teachers)` pair is unique, so asking for a conversation
//! that already exists returns it instead of creating a second one.

use super::ConnectionGraph;
use crate::constants::conversations::DEFAULT_DISPLAY_NAME;
use crate::database::{Database, TeacherAddition};
use crate::directory::{require_role, require_teachers, AccountDirectory};
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::{AccountId, Conversation, ConversationId, RegisteredConversation, Requester, Role};
use crate::utils::text::optional_text;
use std::sync::Arc;

/// Result of adding a teacher to a conversation
#[derive(Debug, Clone)]
pub struct TeacherJoin {
    /// What happened to the requested conversation
    pub outcome: TeacherAddition,
    /// The conversation now holding the teacher; differs from the requested
    /// one when the outcome is `Collided`
    pub conversation: Conversation,
}

/// Conversation registry
#[derive(Clone)]
pub struct ConversationRegistry {
    database: Database,
    directory: Arc<dyn AccountDirectory>,
    graph: ConnectionGraph,
}

impl ConversationRegistry {
    /// Create a registry
    #[must_use]
    pub fn new(
        database: Database,
        directory: Arc<dyn AccountDirectory>,
        graph: ConnectionGraph,
    ) -> Self {
        Self {
            database,
            directory,
            graph,
        }
    }

    /// Create a conversation or return the existing one for the same participants
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if `teachers` is empty
    /// - `RoleViolation` if `student` is not a student or any teacher is not a teacher
    pub async fn create_conversation(
        &self,
        student: AccountId,
        teachers: &[AccountId],
        display_name: Option<&str>,
    ) -> AppResult<RegisteredConversation> {
        if teachers.is_empty() {
            return Err(AppError::invalid_input(
                "A conversation needs at least one teacher",
            ));
        }

        require_role(self.directory.as_ref(), student, Role::Student).await?;
        require_teachers(self.directory.as_ref(), teachers).await?;

        let name = optional_text(display_name).unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_owned());
        let registered = self
            .database
            .chats()
            .create_conversation(student, teachers, &name)
            .await?;

        AppLogger::log_conversation_event(
            &registered.conversation.id.to_string(),
            "create",
            registered.created,
        );
        self.graph.sync_conversation(&registered.conversation).await;

        Ok(registered)
    }

    /// Fetch a conversation the requester participates in
    ///
    /// # Errors
    ///
    /// `ResourceNotFound` if absent, `PermissionDenied` for non-members
    pub async fn get_conversation(
        &self,
        id: ConversationId,
        requester: &Requester,
    ) -> AppResult<Conversation> {
        let conversation = self.load(id).await?;
        if !conversation.is_member(requester.id) {
            return Err(AppError::forbidden(
                "You are not a participant in this conversation",
            ));
        }
        Ok(conversation)
    }

    /// Conversations the requester participates in, most recently active first
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_conversations(&self, requester: &Requester) -> AppResult<Vec<Conversation>> {
        self.database.chats().list_for_account(requester.id).await
    }

    /// Add `teacher` to conversation `id`
    ///
    /// When the enlarged participant set already belongs to another
    /// conversation, that conversation is returned and `id` is unchanged.
    ///
    /// # Errors
    ///
    /// `RoleViolation` if `teacher` is not a teacher, `ResourceNotFound` if the
    /// conversation is absent
    pub async fn add_teacher(&self, id: ConversationId, teacher: AccountId) -> AppResult<TeacherJoin> {
        require_role(self.directory.as_ref(), teacher, Role::Teacher).await?;

        let outcome = self.database.chats().add_teacher(id, teacher).await?;
        let target = match outcome {
            TeacherAddition::Added | TeacherAddition::AlreadyPresent => id,
            TeacherAddition::Collided(existing) => existing,
        };
        let conversation = self.load(target).await?;

        let event = match outcome {
            TeacherAddition::Added => "teacher_added",
            TeacherAddition::AlreadyPresent => "teacher_present",
            TeacherAddition::Collided(_) => "teacher_merged",
        };
        AppLogger::log_conversation_event(&conversation.id.to_string(), event, false);

        if outcome != TeacherAddition::AlreadyPresent {
            self.graph.sync_conversation(&conversation).await;
        }

        Ok(TeacherJoin {
            outcome,
            conversation,
        })
    }

    /// Delete a conversation and its messages; only its student may do so
    ///
    /// # Errors
    ///
    /// `ResourceNotFound` if absent, `PermissionDenied` unless the requester is
    /// the conversation's student
    pub async fn delete_conversation(&self, id: ConversationId, requester: &Requester) -> AppResult<()> {
        let conversation = self.load(id).await?;
        if conversation.student != requester.id {
            return Err(AppError::forbidden(
                "Only the conversation's student can delete it",
            ));
        }

        if !self.database.chats().delete_conversation(id).await? {
            return Err(AppError::not_found("Conversation"));
        }
        AppLogger::log_conversation_event(&id.to_string(), "delete", false);
        Ok(())
    }

    /// Drop a conversation that nothing references yet
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub(crate) async fn discard_if_unused(&self, id: ConversationId) -> AppResult<bool> {
        let discarded = self.database.chats().delete_if_unused(id).await?;
        if discarded {
            AppLogger::log_conversation_event(&id.to_string(), "discard", false);
        }
        Ok(discarded)
    }

    async fn load(&self, id: ConversationId) -> AppResult<Conversation> {
        self.database
            .chats()
            .get_conversation(id)
            .await?
            .ok_or_else(|| AppError::not_found("Conversation"))
    }
}

// ABOUTME: Append-only message ledger gated by conversation membership
// ABOUTME: Validates content, checks the sender is a participant and appends in order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

use crate::constants::limits::MAX_MESSAGE_CHARS;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Conversation, ConversationId, Message, Requester};
use crate::utils::text::required_text;
use tracing::debug;

/// Message ledger
#[derive(Clone)]
pub struct MessageLedger {
    database: Database,
}

impl MessageLedger {
    /// Create a ledger
    #[must_use]
    pub const fn new(database: Database) -> Self {
        Self { database }
    }

    /// Append a message from `sender`
    ///
    /// # Errors
    ///
    /// - `MissingRequiredField` when `content` is blank
    /// - `ResourceNotFound` when the conversation does not exist
    /// - `PermissionDenied` when `sender` is not a participant
    pub async fn post_message(
        &self,
        conversation_id: ConversationId,
        content: &str,
        sender: &Requester,
    ) -> AppResult<Message> {
        let content = required_text("content", content, MAX_MESSAGE_CHARS)?;
        self.member_conversation(conversation_id, sender).await?;

        let message = self
            .database
            .chats()
            .add_message(conversation_id, sender.id, &content)
            .await?;

        debug!(
            conversation_id = %conversation_id,
            message_id = %message.id,
            "Message appended"
        );
        Ok(message)
    }

    /// Messages of a conversation, oldest first
    ///
    /// # Errors
    ///
    /// `ResourceNotFound` or `PermissionDenied` as for [`Self::post_message`]
    pub async fn list_messages(
        &self,
        conversation_id: ConversationId,
        requester: &Requester,
    ) -> AppResult<Vec<Message>> {
        self.member_conversation(conversation_id, requester).await?;
        self.database.chats().get_messages(conversation_id).await
    }

    async fn member_conversation(
        &self,
        id: ConversationId,
        requester: &Requester,
    ) -> AppResult<Conversation> {
        let conversation = self
            .database
            .chats()
            .get_conversation(id)
            .await?
            .ok_or_else(|| AppError::not_found("Conversation"))?;

        if !conversation.is_member(requester.id) {
            return Err(AppError::forbidden(
                "You are not a participant in this conversation",
            ));
        }
        Ok(conversation)
    }
}

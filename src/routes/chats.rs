// ABOUTME: Chat route handlers for conversations between a student and teachers
// ABOUTME: Create (deduplicated), list, view, delete and the membership-gated message log
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

//! Chat routes
//!
//! All handlers require a bearer token. Conversation ids that do not parse
//! are reported as missing conversations.

use super::{json_body, path_id, resolve_account_refs};
use crate::errors::AppError;
use crate::models::ConversationId;
use crate::resources::ServerResources;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

// ============================================================================
// Request Types
// ============================================================================

/// Body of `POST /chats`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatRequest {
    /// Teachers to talk to, as ids or emails
    #[serde(default)]
    pub teachers: Vec<String>,
    /// Optional display name
    #[serde(default)]
    pub chat_name: Option<String>,
}

/// Body of `POST /chats/{id}/messages`
#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    /// Message text
    #[serde(default)]
    pub content: String,
}

// ============================================================================
// Chat Routes
// ============================================================================

/// Chat routes handler
pub struct ChatRoutes;

impl ChatRoutes {
    /// Create all chat routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            // Conversation management
            .route("/chats", post(Self::create_chat).get(Self::list_chats))
            .route(
                "/chats/:chat_id",
                get(Self::get_chat).delete(Self::delete_chat),
            )
            // Messages
            .route(
                "/chats/:chat_id/messages",
                get(Self::list_messages).post(Self::post_message),
            )
            .with_state(resources)
    }

    // ========================================================================
    // Conversation Handlers
    // ========================================================================

    /// Create a conversation, or return the existing one with the same participants
    async fn create_chat(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        payload: Result<Json<CreateChatRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let requester = resources.authenticate(&headers).await?;
        let request = json_body(payload)?;

        let teachers = resolve_account_refs(resources.directory.as_ref(), &request.teachers).await?;
        let registered = resources
            .conversations
            .create_conversation(requester.id, &teachers, request.chat_name.as_deref())
            .await?;

        let status = if registered.created {
            StatusCode::CREATED
        } else {
            StatusCode::OK
        };
        Ok((status, Json(registered.conversation)).into_response())
    }

    async fn list_chats(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let requester = resources.authenticate(&headers).await?;
        let conversations = resources.conversations.list_conversations(&requester).await?;
        Ok((StatusCode::OK, Json(conversations)).into_response())
    }

    async fn get_chat(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(chat_id): Path<String>,
    ) -> Result<Response, AppError> {
        let requester = resources.authenticate(&headers).await?;
        let id: ConversationId = path_id(&chat_id, "Conversation")?;
        let conversation = resources.conversations.get_conversation(id, &requester).await?;
        Ok((StatusCode::OK, Json(conversation)).into_response())
    }

    async fn delete_chat(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(chat_id): Path<String>,
    ) -> Result<Response, AppError> {
        let requester = resources.authenticate(&headers).await?;
        let id: ConversationId = path_id(&chat_id, "Conversation")?;
        resources.conversations.delete_conversation(id, &requester).await?;
        Ok((StatusCode::OK, Json(serde_json::json!({ "deleted": true }))).into_response())
    }

    // ========================================================================
    // Message Handlers
    // ========================================================================

    async fn list_messages(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(chat_id): Path<String>,
    ) -> Result<Response, AppError> {
        let requester = resources.authenticate(&headers).await?;
        let id: ConversationId = path_id(&chat_id, "Conversation")?;
        let messages = resources.messages.list_messages(id, &requester).await?;
        Ok((StatusCode::OK, Json(messages)).into_response())
    }

    async fn post_message(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(chat_id): Path<String>,
        payload: Result<Json<PostMessageRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let requester = resources.authenticate(&headers).await?;
        let id: ConversationId = path_id(&chat_id, "Conversation")?;
        let request = json_body(payload)?;

        let message = resources
            .messages
            .post_message(id, &request.content, &requester)
            .await?;
        Ok((StatusCode::CREATED, Json(message)).into_response())
    }
}

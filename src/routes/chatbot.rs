// ABOUTME: Public chatbot endpoint answering site usage questions
// ABOUTME: No authentication; delegates to the TutorBot service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

use super::json_body;
use crate::errors::AppError;
use crate::llm::ChatMessage;
use crate::resources::ServerResources;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Body of `POST /chatbot/message`
#[derive(Debug, Deserialize)]
pub struct ChatbotRequest {
    /// The visitor's question
    #[serde(default)]
    pub message: String,
    /// Earlier turns, oldest first
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

/// Response of `POST /chatbot/message`
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatbotResponse {
    /// Assistant answer
    pub reply: String,
}

/// Chatbot routes handler
pub struct ChatbotRoutes;

impl ChatbotRoutes {
    /// Create the chatbot route
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/chatbot/message", post(Self::message))
            .with_state(resources)
    }

    async fn message(
        State(resources): State<Arc<ServerResources>>,
        payload: Result<Json<ChatbotRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let request = json_body(payload)?;
        let reply = resources
            .tutor_bot
            .reply(&request.message, &request.history)
            .await?;
        Ok((StatusCode::OK, Json(ChatbotResponse { reply })).into_response())
    }
}

// ABOUTME: Public site assistant answering how-to and support questions
// ABOUTME: Uses the completion provider when configured, canned offline replies otherwise
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

use crate::constants::ai::{
    ASSISTANT_HISTORY_LIMIT, ASSISTANT_MAX_TOKENS, ASSISTANT_TEMPERATURE, SUPPORT_EMAIL,
};
use crate::errors::{AppError, AppResult};
use crate::llm::prompts::TUTOR_BOT_SYSTEM_PROMPT;
use crate::llm::{ChatMessage, ChatRequest, LlmProvider, MessageRole};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const SERVICE: &str = "TutorBot";

/// Site assistant
#[derive(Clone)]
pub struct TutorBot {
    provider: Option<Arc<dyn LlmProvider>>,
    timeout: Duration,
}

impl TutorBot {
    /// Create the assistant
    #[must_use]
    pub fn new(provider: Option<Arc<dyn LlmProvider>>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Answer `message`, taking the last few turns of `history` into account
    ///
    /// # Errors
    ///
    /// - `MissingRequiredField` when the message is blank
    /// - `ExternalTimeout` / `ExternalServiceError` when the provider fails
    pub async fn reply(&self, message: &str, history: &[ChatMessage]) -> AppResult<String> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::missing_field("message"));
        }

        let Some(provider) = self.provider.as_ref() else {
            debug!("No completion provider configured, answering offline");
            return Ok(offline_reply(message));
        };

        let recent = history
            .iter()
            .filter(|turn| turn.role != MessageRole::System)
            .rev()
            .take(ASSISTANT_HISTORY_LIMIT)
            .collect::<Vec<_>>();

        let mut messages = Vec::with_capacity(recent.len() + 2);
        messages.push(ChatMessage::system(TUTOR_BOT_SYSTEM_PROMPT));
        messages.extend(recent.into_iter().rev().cloned());
        messages.push(ChatMessage::user(message));

        let request = ChatRequest::new(messages)
            .with_temperature(ASSISTANT_TEMPERATURE)
            .with_max_tokens(ASSISTANT_MAX_TOKENS);

        let response = tokio::time::timeout(self.timeout, provider.complete(&request))
            .await
            .map_err(|_| AppError::timeout(SERVICE, self.timeout.as_secs()))??;

        Ok(response.content.trim().to_owned())
    }
}

/// Rule-based answer used when no provider is configured
#[must_use]
pub fn offline_reply(message: &str) -> String {
    let lower = message.to_lowercase();

    if ["help", "how to use", "how do i"].iter().any(|k| lower.contains(k)) {
        "Welcome! To use the site: 1) Sign up or log in. 2) Use the dashboard to raise doubts, \
         create chats, or access resources. For more, click 'Help' in the top menu."
            .to_owned()
    } else if ["contact", "support"].iter().any(|k| lower.contains(k)) {
        format!(
            "You can contact support by emailing {SUPPORT_EMAIL} or using the contact form on the Contact page."
        )
    } else {
        format!("TutorBot (offline mode) heard: \"{message}\". Try asking \"How to use the website?\"")
    }
}

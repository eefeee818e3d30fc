// ABOUTME: Background enrichment of new doubts with a generated explanation
// ABOUTME: Detached tokio tasks, bounded by a timeout, that write ai_reply at most once
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

//! # Doubt Enrichment
//!
//! Enrichment never affects the request that created the doubt. Every
//! failure ends in a log line and an `ai_reply` that stays null; nothing is
//! retried.

use crate::database::Database;
use crate::llm::prompts::{enrichment_prompt, ENRICHMENT_SYSTEM_PROMPT};
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};
use crate::models::Doubt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

/// What an enrichment attempt ended with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentOutcome {
    /// Explanation written to the doubt
    Stored,
    /// The doubt already had an explanation; nothing written
    AlreadyEnriched,
    /// No completion provider is configured
    NotConfigured,
    /// The provider did not answer within the time budget
    TimedOut,
    /// The provider failed, answered with nothing usable, or the write failed
    Failed(String),
}

/// Enrichment side-channel
#[derive(Clone)]
pub struct EnrichmentService {
    database: Database,
    provider: Option<Arc<dyn LlmProvider>>,
    timeout: Duration,
    enabled: bool,
}

impl EnrichmentService {
    /// Create an enrichment service
    #[must_use]
    pub fn new(
        database: Database,
        provider: Option<Arc<dyn LlmProvider>>,
        timeout: Duration,
        enabled: bool,
    ) -> Self {
        Self {
            database,
            provider,
            timeout,
            enabled,
        }
    }

    /// Run [`Self::enrich`] on a detached task
    ///
    /// Returns `None` when enrichment is disabled. Callers are not expected to
    /// await the handle.
    pub fn schedule(&self, doubt: Doubt) -> Option<JoinHandle<EnrichmentOutcome>> {
        if !self.enabled {
            return None;
        }
        let service = self.clone();
        Some(tokio::spawn(async move { service.enrich(&doubt).await }))
    }

    /// Request an explanation for `doubt` and store it if none exists yet
    #[instrument(skip(self, doubt), fields(doubt_id = %doubt.id))]
    pub async fn enrich(&self, doubt: &Doubt) -> EnrichmentOutcome {
        let Some(provider) = self.provider.as_ref() else {
            info!("No completion provider configured, skipping enrichment");
            return EnrichmentOutcome::NotConfigured;
        };

        let request = ChatRequest::new(vec![
            ChatMessage::system(ENRICHMENT_SYSTEM_PROMPT),
            ChatMessage::user(enrichment_prompt(doubt)),
        ]);

        let reply = match tokio::time::timeout(self.timeout, provider.complete(&request)).await {
            Err(_) => {
                warn!(
                    provider = provider.name(),
                    timeout_secs = self.timeout.as_secs(),
                    "Enrichment timed out"
                );
                return EnrichmentOutcome::TimedOut;
            }
            Ok(Err(e)) => {
                warn!(provider = provider.name(), error = %e, "Enrichment failed");
                return EnrichmentOutcome::Failed(e.to_string());
            }
            Ok(Ok(response)) => response.content,
        };

        let reply = reply.trim();
        if reply.is_empty() {
            warn!(provider = provider.name(), "Enrichment returned an empty explanation");
            return EnrichmentOutcome::Failed("empty completion".to_owned());
        }

        match self.database.doubts().set_ai_reply(doubt.id, reply).await {
            Ok(true) => {
                info!(reply_chars = reply.chars().count(), "Doubt enriched");
                EnrichmentOutcome::Stored
            }
            Ok(false) => EnrichmentOutcome::AlreadyEnriched,
            Err(e) => {
                warn!(error = %e, "Failed to store enrichment");
                EnrichmentOutcome::Failed(e.to_string())
            }
        }
    }
}

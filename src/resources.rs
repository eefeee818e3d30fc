// ABOUTME: Shared server resources handed to every route as axum state
// ABOUTME: Wires the database, directory, auth manager and domain services together
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::directory::AccountDirectory;
use crate::errors::AppResult;
use crate::llm::{build_provider, LlmProvider};
use crate::models::Requester;
use crate::services::{
    ConnectionGraph, ConversationRegistry, DoubtService, EnrichmentService, MessageLedger,
    TutorBot,
};
use http::HeaderMap;
use std::sync::Arc;
use std::time::Duration;

/// Everything a request handler may need
#[derive(Clone)]
pub struct ServerResources {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
    /// Storage
    pub database: Database,
    /// Account lookups
    pub directory: Arc<dyn AccountDirectory>,
    /// Token issue and verification
    pub auth: AuthManager,
    /// Doubt lifecycle engine
    pub doubts: DoubtService,
    /// Conversation registry
    pub conversations: ConversationRegistry,
    /// Message ledger
    pub messages: MessageLedger,
    /// Connection graph
    pub connections: ConnectionGraph,
    /// Site assistant
    pub tutor_bot: TutorBot,
}

impl ServerResources {
    /// Build resources, choosing the completion provider from configuration
    #[must_use]
    pub fn new(database: Database, config: ServerConfig) -> Self {
        let provider = build_provider(&config.ai);
        Self::with_provider(database, config, provider)
    }

    /// Build resources around an explicit completion provider
    #[must_use]
    pub fn with_provider(
        database: Database,
        config: ServerConfig,
        provider: Option<Arc<dyn LlmProvider>>,
    ) -> Self {
        let directory: Arc<dyn AccountDirectory> = Arc::new(database.accounts());
        let timeout = Duration::from_secs(config.ai.timeout_secs);

        let connections = ConnectionGraph::new(database.clone(), Arc::clone(&directory));
        let conversations =
            ConversationRegistry::new(database.clone(), Arc::clone(&directory), connections.clone());
        let enrichment = EnrichmentService::new(
            database.clone(),
            provider.clone(),
            timeout,
            config.ai.enrichment_enabled,
        );
        let doubts = DoubtService::new(
            database.clone(),
            Arc::clone(&directory),
            conversations.clone(),
            enrichment,
        );

        Self {
            auth: AuthManager::new(&config.auth),
            messages: MessageLedger::new(database.clone()),
            tutor_bot: TutorBot::new(provider, timeout),
            config: Arc::new(config),
            database,
            directory,
            doubts,
            conversations,
            connections,
        }
    }

    /// Authenticate the request's bearer token
    ///
    /// # Errors
    ///
    /// Returns an authentication error when the token is missing or invalid
    pub async fn authenticate(&self, headers: &HeaderMap) -> AppResult<Requester> {
        self.auth.authenticate(headers, self.directory.as_ref()).await
    }
}

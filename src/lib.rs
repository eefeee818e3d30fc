// ABOUTME: Main library entry point for the TutorLink API
// ABOUTME: Doubt assignment, deduplicated teacher/student conversations and AI-assisted explanations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

#![recursion_limit = "256"]
#![deny(unsafe_code)]

//! # TutorLink Server
//!
//! Students raise doubts; teachers covering the doubt's subject discover and
//! accept them. Accepting a doubt bridges it to a conversation between the
//! student and the accepting teachers, deduplicated by participant set.
//! Participants exchange messages through a membership-gated ledger, and a
//! background task attaches a generated explanation to each new doubt.
//!
//! ## Architecture
//!
//! - **Database**: `SQLite` storage managers for accounts, doubts, chats and connections
//! - **Services**: the doubt lifecycle engine, conversation registry, message
//!   ledger, connection graph, enrichment side-channel and site assistant
//! - **Routes**: a thin axum adapter over the services
//! - **LLM**: pluggable completion providers (Gemini, `OpenAI`-compatible)
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tutorlink_server::config::ServerConfig;
//! use tutorlink_server::database::Database;
//! use tutorlink_server::resources::ServerResources;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     let database = Database::new(&config.database_url).await?;
//!     let resources = Arc::new(ServerResources::new(database, config));
//!     tutorlink_server::server::serve(resources).await
//! }
//! ```

/// JWT issuance and request authentication
pub mod auth;

/// Environment-driven configuration
pub mod config;

/// Subject catalog, limits and environment variable names
pub mod constants;

/// `SQLite` persistence
pub mod database;

/// Account directory contract
pub mod directory;

/// Unified error handling
pub mod errors;

/// Completion providers and prompts
pub mod llm;

/// Structured logging setup
pub mod logging;

/// HTTP middleware
pub mod middleware;

/// Domain models
pub mod models;

/// Shared state for route handlers
pub mod resources;

/// HTTP route groups
pub mod routes;

/// Router assembly and serving
pub mod server;

/// Domain services
pub mod services;

/// Small shared helpers
pub mod utils;

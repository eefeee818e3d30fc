// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides database, account, resources and bearer token helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `tutorlink_server`

use anyhow::Result;
use std::path::Path;
use std::sync::{Arc, Once};
use std::time::Duration;
use tutorlink_server::{
    config::{AiConfig, AuthConfig, DatabaseUrl, Environment, ServerConfig},
    database::{Database, NewAccount},
    llm::LlmProvider,
    models::{Account, Doubt, DoubtId, NewDoubt, Requester, Role},
    resources::ServerResources,
};

static INIT_LOGGER: Once = Once::new();

/// Fixed signing secret so tokens can be minted by tests
pub const TEST_JWT_SECRET: &str = "tutorlink-test-secret-0123456789abcdef";

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard test database setup
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    Ok(Database::in_memory().await?)
}

/// Configuration used by every test server
pub fn test_config() -> ServerConfig {
    ServerConfig {
        http_port: 0,
        environment: Environment::Testing,
        auth: AuthConfig {
            jwt_secret: TEST_JWT_SECRET.to_owned(),
            jwt_expiry_hours: 1,
        },
        cors_allowed_origins: vec!["*".to_owned()],
        ai: AiConfig {
            timeout_secs: 1,
            ..AiConfig::default()
        },
        ..ServerConfig::default()
    }
}

/// Resources around a fresh in-memory database and an optional fake provider
pub async fn create_test_server_resources(
    provider: Option<Arc<dyn LlmProvider>>,
) -> Result<Arc<ServerResources>> {
    let database = create_test_database().await?;
    Ok(Arc::new(ServerResources::with_provider(
        database,
        test_config(),
        provider,
    )))
}

/// Resources around a WAL database file in `dir`, served by a multi-connection pool
///
/// Unlike the in-memory database, concurrent tasks really run in parallel here.
pub async fn create_file_test_server_resources(dir: &Path) -> Result<Arc<ServerResources>> {
    init_test_logging();
    let url = DatabaseUrl::parse_url(&format!("sqlite:{}", dir.join("tutorlink.db").display()))?;
    let database = Database::new(&url).await?;
    Ok(Arc::new(ServerResources::with_provider(
        database,
        test_config(),
        None,
    )))
}

/// Register a student
pub async fn create_student(database: &Database, email: &str) -> Result<Account> {
    Ok(database
        .accounts()
        .create(NewAccount {
            role: Role::Student,
            email: email.to_owned(),
            display_name: email.split('@').next().unwrap_or(email).to_owned(),
            subjects: Vec::new(),
        })
        .await?)
}

/// Register a teacher covering `subjects`
pub async fn create_teacher(database: &Database, email: &str, subjects: &[&str]) -> Result<Account> {
    Ok(database
        .accounts()
        .create(NewAccount {
            role: Role::Teacher,
            email: email.to_owned(),
            display_name: email.split('@').next().unwrap_or(email).to_owned(),
            subjects: subjects.iter().map(|s| (*s).to_owned()).collect(),
        })
        .await?)
}

/// Requester view of an account
pub fn requester(account: &Account) -> Requester {
    Requester::from(account)
}

/// A doubt input with no teachers assigned
pub fn new_doubt(subject: &str, title: &str) -> NewDoubt {
    NewDoubt {
        subject: subject.to_owned(),
        title: title.to_owned(),
        description: format!("Please explain {title}"),
        teachers: Vec::new(),
    }
}

/// `Authorization` header value for `account`
pub fn bearer(resources: &ServerResources, account: &Account) -> String {
    let token = resources.auth.generate_token(account).unwrap();
    format!("Bearer {token}")
}

/// Poll until the doubt's explanation is stored or `timeout` elapses
pub async fn wait_for_ai_reply(
    database: &Database,
    id: DoubtId,
    timeout: Duration,
) -> Option<Doubt> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if let Ok(Some(doubt)) = database.doubts().get(id).await {
            if doubt.ai_reply.is_some() {
                return Some(doubt);
            }
        }
        if tokio::time::Instant::now() >= deadline {
            return None;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

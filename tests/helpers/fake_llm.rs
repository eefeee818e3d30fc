// ABOUTME: Scripted completion providers for enrichment and assistant tests
// ABOUTME: Fixed replies, failures, empty answers and slow responses without network access
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tutorlink_server::errors::AppError;
use tutorlink_server::llm::{ChatRequest, ChatResponse, LlmProvider};

/// How the fake provider answers
#[derive(Debug, Clone)]
pub enum Script {
    /// Answer with this text
    Reply(String),
    /// Fail with an upstream error
    Fail,
    /// Sleep, then answer
    Slow(Duration),
}

/// Provider returning a scripted answer and recording what it was asked
pub struct FakeProvider {
    script: Script,
    calls: AtomicUsize,
    last_request: Mutex<Option<ChatRequest>>,
}

impl FakeProvider {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn replying(text: &str) -> Arc<Self> {
        Self::new(Script::Reply(text.to_owned()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn default_model(&self) -> &str {
        "fake-model"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());

        let content = match &self.script {
            Script::Reply(text) => text.clone(),
            Script::Fail => return Err(AppError::external_service("fake", "upstream exploded")),
            Script::Slow(delay) => {
                tokio::time::sleep(*delay).await;
                "too late".to_owned()
            }
        };

        Ok(ChatResponse {
            content,
            model: "fake-model".to_owned(),
            usage: None,
            finish_reason: Some("stop".to_owned()),
        })
    }
}

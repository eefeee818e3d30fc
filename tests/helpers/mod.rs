// ABOUTME: Shared test helpers for integration tests
// ABOUTME: Exports the HTTP request harness and scripted completion providers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub mod axum_test;
pub mod fake_llm;

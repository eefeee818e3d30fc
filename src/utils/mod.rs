// ABOUTME: Utility modules for common functionality across the application
// ABOUTME: Contains shared helpers for timestamps, bearer tokens, HTTP clients and input text
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

/// Bearer token extraction
pub mod auth;
/// Monotonic UTC timestamps
pub mod clock;
/// HTTP client configuration and helpers
pub mod http_client;
/// Required-text validation
pub mod text;

// ABOUTME: Shared HTTP client construction with timeout configuration
// ABOUTME: Used by the completion providers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Connection timeout applied to every outbound client
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Create a new HTTP client with custom timeout settings
///
/// Falls back to a default client if the builder fails.
#[must_use]
pub fn create_client_with_timeout(timeout_secs: u64, connect_timeout_secs: u64) -> Client {
    ClientBuilder::new()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .build()
        .unwrap_or_else(|_| Client::new())
}

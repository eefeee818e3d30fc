// ABOUTME: Configuration management module for centralized server settings
// ABOUTME: Re-exports environment-driven server configuration types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

//! Configuration module
//!
//! All settings come from environment variables; there is no config file.

/// Environment and server configuration
pub mod environment;

pub use environment::{AiConfig, AuthConfig, DatabaseUrl, Environment, LlmProviderKind, ServerConfig};

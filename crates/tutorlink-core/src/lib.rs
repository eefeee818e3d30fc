// ABOUTME: Core types and constants for the TutorLink doubt assignment platform
// ABOUTME: Foundation crate with error handling, domain models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

#![deny(unsafe_code)]

//! # TutorLink Core
//!
//! Foundation crate providing shared types and constants for the TutorLink
//! platform. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and `DatabaseError`
//! - **models**: Accounts, doubts, conversations, messages and their identifiers
//! - **constants**: Subject catalog, limits and defaults

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (Account, Doubt, Conversation, Message)
pub mod models;

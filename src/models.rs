// ABOUTME: Core data models re-exported from tutorlink-core
// ABOUTME: Accounts, doubts, conversations, messages and typed identifiers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

//! # Data Models

pub use tutorlink_core::models::*;

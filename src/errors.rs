// ABOUTME: Unified error handling re-exported from tutorlink-core
// ABOUTME: AppError, ErrorCode and AppResult used by every server module
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

//! # Unified Error Handling System
//!
//! The error types live in `tutorlink-core` so that the core crate and the
//! server share one taxonomy. This module re-exports them.

pub use tutorlink_core::errors::*;

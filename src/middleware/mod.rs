// ABOUTME: HTTP middleware for CORS and request tracing
// ABOUTME: Provides request ID generation and span creation for structured logging
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

/// Cross-origin configuration
pub mod cors;
/// Request ids and HTTP spans
pub mod tracing;

// CORS configuration
pub use cors::setup_cors;

// Request tracing
pub use tracing::{create_request_span, request_id_layers, REQUEST_ID_HEADER};

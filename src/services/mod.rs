// ABOUTME: Domain service layer for the doubt-to-chat assignment engine
// ABOUTME: Protocol-agnostic business rules shared by the HTTP routes and the CLI
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

//! Domain service layer
//!
//! Route handlers authenticate and parse; everything that decides who may do
//! what, and in which order storage is touched, lives here.

/// Teacher/student connection index maintenance
pub mod connections;

/// Conversation creation, deduplication, membership and deletion
pub mod conversations;

/// Doubt creation, discovery and teacher acceptance
pub mod doubts;

/// Background doubt explanations
pub mod enrichment;

/// Membership-gated message log
pub mod messages;

/// Public site assistant
pub mod tutor_bot;

pub use connections::ConnectionGraph;
pub use conversations::{ConversationRegistry, TeacherJoin};
pub use doubts::{AcceptedDoubt, DoubtService};
pub use enrichment::{EnrichmentOutcome, EnrichmentService};
pub use messages::MessageLedger;
pub use tutor_bot::TutorBot;

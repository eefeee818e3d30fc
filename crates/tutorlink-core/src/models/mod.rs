// ABOUTME: Core data models for the TutorLink platform
// ABOUTME: Re-exports account, doubt, conversation and connection types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

//! Core data models

/// Account, role and requester types
pub mod account;
/// Conversation and message types
pub mod conversation;
/// Doubt types
pub mod doubt;
/// Strongly typed identifiers
pub mod ids;

pub use account::{Account, Requester, Role};
pub use conversation::{participant_key, Conversation, Message, RegisteredConversation};
pub use doubt::{Doubt, DoubtFilter, DoubtStatus, NewDoubt};
pub use ids::{AccountId, ConversationId, DoubtId, MessageId};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Derived link between a teacher and a student they share a conversation with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// Teacher side
    pub teacher: AccountId,
    /// Student side
    pub student: AccountId,
    /// First time the pair was linked
    pub connected_at: DateTime<Utc>,
}

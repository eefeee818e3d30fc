// ABOUTME: Conversation and message models shared by the registry and the ledger
// ABOUTME: A conversation joins exactly one student with one or more teachers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

use super::{AccountId, ConversationId, MessageId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A thread between one student and a set of teachers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Conversation identifier
    pub id: ConversationId,
    /// Name shown in chat lists
    pub display_name: String,
    /// The single student; never changes
    pub student: AccountId,
    /// Teachers in the order they joined
    pub teachers: Vec<AccountId>,
    /// Most recent message, if any
    pub latest_message: Option<MessageId>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last write time
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// True when `account` is the student or one of the teachers
    #[must_use]
    pub fn is_member(&self, account: AccountId) -> bool {
        self.student == account || self.teachers.contains(&account)
    }

    /// Dedup key for this conversation's participant set
    #[must_use]
    pub fn participant_key(&self) -> String {
        participant_key(self.student, &self.teachers)
    }
}

/// Canonical key for a (student, teacher set) pair
///
/// Teacher order and duplicates do not affect the key.
#[must_use]
pub fn participant_key(student: AccountId, teachers: &[AccountId]) -> String {
    let mut ids: Vec<String> = teachers.iter().map(ToString::to_string).collect();
    ids.sort_unstable();
    ids.dedup();
    format!("{student}:{}", ids.join(","))
}

/// An immutable entry in a conversation's message log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Message identifier
    pub id: MessageId,
    /// Owning conversation
    pub conversation: ConversationId,
    /// Author
    pub sender: AccountId,
    /// Non-empty text
    pub content: String,
    /// Append time; strictly increasing within the process
    pub created_at: DateTime<Utc>,
}

/// Result of asking the registry for a conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredConversation {
    /// The conversation that now holds the participant set
    pub conversation: Conversation,
    /// False when an existing conversation was reused
    pub created: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_key_ignores_order_and_duplicates() {
        let student = AccountId::new();
        let a = AccountId::new();
        let b = AccountId::new();

        assert_eq!(
            participant_key(student, &[a, b]),
            participant_key(student, &[b, a, b])
        );
        assert_ne!(
            participant_key(student, &[a]),
            participant_key(student, &[a, b])
        );
    }
}

// ABOUTME: Doubt models: a question raised by a student and its assignment state
// ABOUTME: Doubt record, status enum, creation input and listing filter
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

use super::{AccountId, ConversationId, DoubtId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a doubt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoubtStatus {
    /// Newly raised
    #[default]
    Pending,
    /// A teacher has answered
    Answered,
    /// Closed by the student
    Resolved,
}

impl DoubtStatus {
    /// Storage representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Answered => "answered",
            Self::Resolved => "resolved",
        }
    }
}

impl fmt::Display for DoubtStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DoubtStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "answered" => Ok(Self::Answered),
            "resolved" => Ok(Self::Resolved),
            other => Err(format!("unknown doubt status '{other}'")),
        }
    }
}

/// A question raised by a student
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doubt {
    /// Doubt identifier
    pub id: DoubtId,
    /// Subject the doubt belongs to
    pub subject: String,
    /// Short title
    pub title: String,
    /// Full description
    pub description: String,
    /// Lifecycle status
    pub status: DoubtStatus,
    /// Student who raised it
    pub student: AccountId,
    /// Teachers that accepted it, in acceptance order; empty means unassigned
    pub teachers: Vec<AccountId>,
    /// Conversation bridged from this doubt
    pub conversation: Option<ConversationId>,
    /// Generated explanation, set asynchronously
    pub ai_reply: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Doubt {
    /// No teacher has accepted the doubt yet
    #[must_use]
    pub fn is_unassigned(&self) -> bool {
        self.teachers.is_empty()
    }

    /// True when `account` is one of the doubt's teachers
    #[must_use]
    pub fn has_teacher(&self, account: AccountId) -> bool {
        self.teachers.contains(&account)
    }
}

/// Input for creating a doubt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDoubt {
    /// Subject the doubt belongs to
    pub subject: String,
    /// Short title
    pub title: String,
    /// Full description
    pub description: String,
    /// Teachers assigned at creation time
    pub teachers: Vec<AccountId>,
}

/// Listing filter for doubts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DoubtFilter {
    /// Restrict to a given student, overriding role scoping
    pub student: Option<AccountId>,
}

// ABOUTME: Account models for students and teachers
// ABOUTME: Role enum, Account record and the authenticated Requester view
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

use super::AccountId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account role; immutable once the account exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Raises doubts and owns conversations
    Student,
    /// Accepts doubts matching their subjects
    Teacher,
}

impl Role {
    /// Storage representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::Teacher => "Teacher",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "teacher" => Ok(Self::Teacher),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// A registered student or teacher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Account identifier
    pub id: AccountId,
    /// Student or teacher
    pub role: Role,
    /// Unique, case-insensitive email
    pub email: String,
    /// Name shown to other participants
    pub display_name: String,
    /// Subjects a teacher covers; always empty for students
    pub subjects: Vec<String>,
    /// Registration time
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// True when the account is a teacher
    #[must_use]
    pub fn is_teacher(&self) -> bool {
        self.role == Role::Teacher
    }

    /// True when the account is a student
    #[must_use]
    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }
}

/// The authenticated caller of an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    /// Caller identity
    pub id: AccountId,
    /// Caller role
    pub role: Role,
    /// Caller subjects (teachers only)
    pub subjects: Vec<String>,
}

impl Requester {
    /// True when the caller is a teacher
    #[must_use]
    pub fn is_teacher(&self) -> bool {
        self.role == Role::Teacher
    }

    /// True when the caller is a student
    #[must_use]
    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }

    /// True when the caller teaches `subject`
    #[must_use]
    pub fn teaches(&self, subject: &str) -> bool {
        self.is_teacher() && self.subjects.iter().any(|s| s == subject)
    }
}

impl From<&Account> for Requester {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            role: account.role,
            subjects: account.subjects.clone(),
        }
    }
}

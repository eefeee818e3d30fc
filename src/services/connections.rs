// ABOUTME: Keeps the derived teacher/student connection index in step with conversations
// ABOUTME: Best-effort synchronization after commits plus both-direction queries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

use crate::database::Database;
use crate::directory::AccountDirectory;
use crate::errors::AppResult;
use crate::models::{AccountId, Connection, Conversation, Requester, Role};
use std::sync::Arc;
use tracing::{debug, warn};

/// Connection graph synchronizer
///
/// The graph is never consulted for authorization; losing an update only
/// delays a teacher seeing a student in their list.
#[derive(Clone)]
pub struct ConnectionGraph {
    database: Database,
    directory: Arc<dyn AccountDirectory>,
}

impl ConnectionGraph {
    /// Create a synchronizer over `database`
    #[must_use]
    pub fn new(database: Database, directory: Arc<dyn AccountDirectory>) -> Self {
        Self {
            database,
            directory,
        }
    }

    /// Connect every teacher of `conversation` to its student
    ///
    /// Failures are logged and swallowed.
    pub async fn sync_conversation(&self, conversation: &Conversation) {
        let connections = self.database.connections();

        for teacher in &conversation.teachers {
            match self.directory.find_by_id(*teacher).await {
                Ok(Some(account)) if account.role == Role::Teacher => {}
                Ok(_) => {
                    warn!(
                        teacher_id = %teacher,
                        conversation_id = %conversation.id,
                        "Skipping connection for account that is not a teacher"
                    );
                    continue;
                }
                Err(e) => {
                    warn!(teacher_id = %teacher, error = %e, "Teacher lookup failed during connection sync");
                    continue;
                }
            }

            match connections.connect(*teacher, conversation.student).await {
                Ok(true) => debug!(
                    teacher_id = %teacher,
                    student_id = %conversation.student,
                    "Connection recorded"
                ),
                Ok(false) => {}
                Err(e) => warn!(
                    teacher_id = %teacher,
                    student_id = %conversation.student,
                    error = %e,
                    "Failed to record connection"
                ),
            }
        }
    }

    /// Students connected to `teacher`
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn students_of(&self, teacher: AccountId) -> AppResult<Vec<Connection>> {
        self.database.connections().students_of(teacher).await
    }

    /// Teachers connected to `student`
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn teachers_of(&self, student: AccountId) -> AppResult<Vec<Connection>> {
        self.database.connections().teachers_of(student).await
    }

    /// Connections seen from the requester's side of the graph
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn for_requester(&self, requester: &Requester) -> AppResult<Vec<Connection>> {
        match requester.role {
            Role::Teacher => self.students_of(requester.id).await,
            Role::Student => self.teachers_of(requester.id).await,
        }
    }
}

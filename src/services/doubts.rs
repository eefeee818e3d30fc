// ABOUTME: Doubt lifecycle engine: creation, discovery, visibility and teacher acceptance
// ABOUTME: Bridges an accepted doubt to a deduplicated conversation without a cross-entity lock
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

//! # Doubt Lifecycle
//!
//! Accepting a doubt touches three records (the doubt's teacher set, the
//! doubt's conversation link and the conversation itself) without one
//! transaction around them. Each step is individually safe to repeat:
//!
//! - teacher-set additions are unions, so concurrent accepts never overwrite
//!   one another;
//! - the conversation link is a compare-and-set on a null link; the loser
//!   discards what it created and joins the winner's conversation;
//! - conversation creation dedupes by participant set, so a retried accept
//!   reuses whatever an earlier partial attempt created.
//!
//! An accept only returns once it has re-read the doubt and found its linked
//! conversation holding every doubt teacher. Whoever relinks the doubt or adds
//! a teacher re-checks afterwards, so the last writer repairs any teacher a
//! concurrent relink left behind.

use super::{ConversationRegistry, EnrichmentService};
use crate::constants::conversations::DOUBT_CHAT_PREFIX;
use crate::constants::limits::{MAX_DESCRIPTION_CHARS, MAX_TITLE_CHARS};
use crate::database::{Database, TeacherAddition};
use crate::directory::{require_teachers, AccountDirectory};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::logging::AppLogger;
use crate::models::{
    AccountId, Conversation, ConversationId, Doubt, DoubtFilter, DoubtId, NewDoubt, Requester,
};
use crate::utils::text::required_text;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Re-read rounds before an accept gives up settling on a conversation
const BRIDGE_ROUNDS: usize = 16;

/// An accepted doubt together with the conversation it is bridged to
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedDoubt {
    /// The doubt after acceptance
    #[serde(flatten)]
    pub doubt: Doubt,
    /// The linked conversation
    pub chat: Conversation,
}

/// Doubt lifecycle engine
#[derive(Clone)]
pub struct DoubtService {
    database: Database,
    directory: Arc<dyn AccountDirectory>,
    registry: ConversationRegistry,
    enrichment: EnrichmentService,
}

impl DoubtService {
    /// Create the engine
    #[must_use]
    pub fn new(
        database: Database,
        directory: Arc<dyn AccountDirectory>,
        registry: ConversationRegistry,
        enrichment: EnrichmentService,
    ) -> Self {
        Self {
            database,
            directory,
            registry,
            enrichment,
        }
    }

    // ========================================================================
    // Creation
    // ========================================================================

    /// Raise a doubt on behalf of a student
    ///
    /// Returns as soon as the doubt is stored; enrichment runs afterwards on a
    /// detached task. When `teachers` is non-empty the doubt starts assigned and
    /// a `Doubt: <title>` conversation is created or reused for it.
    ///
    /// # Errors
    ///
    /// - `RoleViolation` if the requester is not a student or a listed teacher
    ///   is not a teacher
    /// - `MissingRequiredField` / `InvalidInput` for blank or oversized fields
    pub async fn create_doubt(&self, new_doubt: NewDoubt, requester: &Requester) -> AppResult<Doubt> {
        if !requester.is_student() {
            return Err(AppError::role_violation("Only students can raise doubts"));
        }

        let mut teachers: Vec<AccountId> = Vec::with_capacity(new_doubt.teachers.len());
        for teacher in new_doubt.teachers {
            if !teachers.contains(&teacher) {
                teachers.push(teacher);
            }
        }

        let validated = NewDoubt {
            subject: required_text("subject", &new_doubt.subject, MAX_TITLE_CHARS)?,
            title: required_text("title", &new_doubt.title, MAX_TITLE_CHARS)?,
            description: required_text("description", &new_doubt.description, MAX_DESCRIPTION_CHARS)?,
            teachers,
        };
        require_teachers(self.directory.as_ref(), &validated.teachers).await?;

        let mut doubt = self.database.doubts().create(requester.id, &validated).await?;
        AppLogger::log_doubt_event(&doubt.id.to_string(), &requester.id.to_string(), "create");

        if !doubt.teachers.is_empty() {
            let registered = self
                .registry
                .create_conversation(doubt.student, &doubt.teachers, Some(&chat_name(&doubt)))
                .await?;
            let conversation = registered.conversation.id;
            if self.database.doubts().link_conversation(doubt.id, conversation).await? {
                doubt.conversation = Some(conversation);
            }
        }

        // Detached
        drop(self.enrichment.schedule(doubt.clone()));

        Ok(doubt)
    }

    // ========================================================================
    // Discovery
    // ========================================================================

    /// Unassigned doubts in the requesting teacher's subjects, newest first
    ///
    /// # Errors
    ///
    /// `RoleViolation` if the requester is not a teacher
    pub async fn list_unassigned_doubts(&self, requester: &Requester) -> AppResult<Vec<Doubt>> {
        if !requester.is_teacher() {
            return Err(AppError::role_violation(
                "Only teachers can browse unassigned doubts",
            ));
        }
        self.database.doubts().list_unassigned(&requester.subjects).await
    }

    /// Doubts relevant to the requester, newest first
    ///
    /// Students see their own doubts and teachers the doubts they accepted,
    /// unless `filter.student` names a student explicitly.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_doubts(&self, requester: &Requester, filter: DoubtFilter) -> AppResult<Vec<Doubt>> {
        let doubts = self.database.doubts();
        match filter.student {
            Some(student) => doubts.list_for_student(student).await,
            None if requester.is_student() => doubts.list_for_student(requester.id).await,
            None => doubts.list_for_teacher(requester.id).await,
        }
    }

    /// Fetch a single doubt
    ///
    /// Visible to its student, its teachers and, while unassigned, to teachers
    /// of its subject.
    ///
    /// # Errors
    ///
    /// `ResourceNotFound` if absent, `PermissionDenied` if not visible
    pub async fn get_doubt(&self, id: DoubtId, requester: &Requester) -> AppResult<Doubt> {
        let doubt = self.load(id).await?;

        let visible = doubt.student == requester.id
            || doubt.has_teacher(requester.id)
            || (doubt.is_unassigned() && requester.teaches(&doubt.subject));
        if !visible {
            return Err(AppError::forbidden("You cannot view this doubt"));
        }
        Ok(doubt)
    }

    // ========================================================================
    // Acceptance
    // ========================================================================

    /// Accept a doubt as the requesting teacher
    ///
    /// Idempotent: accepting twice leaves one occurrence of the teacher and the
    /// same conversation.
    ///
    /// # Errors
    ///
    /// `RoleViolation` if the requester is not a teacher, `ResourceNotFound` if
    /// the doubt does not exist
    pub async fn accept_doubt(&self, id: DoubtId, requester: &Requester) -> AppResult<AcceptedDoubt> {
        if !requester.is_teacher() {
            return Err(AppError::role_violation("Only teachers can accept doubts"));
        }

        self.load(id).await?;
        let added = self.database.doubts().add_teacher(id, requester.id).await?;
        debug!(doubt_id = %id, teacher_id = %requester.id, added, "Teacher added to doubt");

        let chat = self.bridge_conversation(id, requester.id).await?;
        let doubt = self.load(id).await?;

        AppLogger::log_doubt_event(&id.to_string(), &requester.id.to_string(), "accept");
        Ok(AcceptedDoubt { doubt, chat })
    }

    /// Settle the doubt on a linked conversation that holds every doubt teacher
    ///
    /// Each round re-reads the doubt, so a relink or teacher addition made by a
    /// concurrent accept is picked up before this accept reports success.
    async fn bridge_conversation(&self, id: DoubtId, teacher: AccountId) -> AppResult<Conversation> {
        for _ in 0..BRIDGE_ROUNDS {
            let doubt = self.load(id).await?;

            let Some(linked) = doubt.conversation else {
                self.start_conversation(&doubt).await?;
                continue;
            };

            // A deleted conversation clears its doubt link in the same transaction
            let Some(conversation) = self.database.chats().get_conversation(linked).await? else {
                continue;
            };

            let missing: Vec<AccountId> = doubt
                .teachers
                .iter()
                .filter(|t| !conversation.teachers.contains(t))
                .copied()
                .collect();
            if missing.is_empty() {
                return Ok(conversation);
            }

            self.join_conversation(&doubt, linked, &missing).await?;
        }

        warn!(doubt_id = %id, teacher_id = %teacher, "Accept did not settle on a conversation");
        Err(AppError::internal(format!(
            "Could not bridge doubt {id} to a conversation"
        )))
    }

    /// Create the doubt's conversation and try to link it
    async fn start_conversation(&self, doubt: &Doubt) -> AppResult<()> {
        let registered = self
            .registry
            .create_conversation(doubt.student, &doubt.teachers, Some(&chat_name(doubt)))
            .await?;
        let candidate = registered.conversation.id;

        if self.database.doubts().link_conversation(doubt.id, candidate).await? {
            return Ok(());
        }

        // Another accept linked first; ours is dropped unless someone else reused it
        if registered.created {
            self.registry.discard_if_unused(candidate).await?;
        }
        Ok(())
    }

    /// Add `teachers` to the linked conversation, following a collision if one occurs
    async fn join_conversation(
        &self,
        doubt: &Doubt,
        linked: ConversationId,
        teachers: &[AccountId],
    ) -> AppResult<()> {
        for teacher in teachers {
            let join = match self.registry.add_teacher(linked, *teacher).await {
                Ok(join) => join,
                // Deleted underneath us; the next round sees the cleared link
                Err(e) if e.code == ErrorCode::ResourceNotFound => return Ok(()),
                Err(e) => return Err(e),
            };

            if let TeacherAddition::Collided(existing) = join.outcome {
                let moved = self
                    .database
                    .doubts()
                    .relink_conversation(doubt.id, linked, existing)
                    .await?;
                debug!(doubt_id = %doubt.id, from = %linked, to = %existing, moved, "Doubt relinked to existing conversation");
                return Ok(());
            }
        }
        Ok(())
    }

    async fn load(&self, id: DoubtId) -> AppResult<Doubt> {
        self.database
            .doubts()
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found("Doubt"))
    }
}

fn chat_name(doubt: &Doubt) -> String {
    format!("{DOUBT_CHAT_PREFIX}{}", doubt.title)
}

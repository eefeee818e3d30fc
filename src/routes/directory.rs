// ABOUTME: Directory browsing routes: teachers by subject, the requester's connections and subjects
// ABOUTME: Read-only views; nothing here is used for authorization
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

use crate::constants::subjects::CATALOG;
use crate::errors::AppError;
use crate::models::{Account, AccountId, Role};
use crate::resources::ServerResources;
use crate::utils::text::optional_text;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Query of `GET /teachers`
#[derive(Debug, Default, Deserialize)]
pub struct ListTeachersQuery {
    /// Only teachers covering this subject
    pub subject: Option<String>,
}

/// Directory routes handler
pub struct DirectoryRoutes;

impl DirectoryRoutes {
    /// Create teacher, connection and subject routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/teachers", get(Self::list_teachers))
            .route("/connections", get(Self::list_connections))
            .route("/subjects", get(Self::list_subjects))
            .with_state(resources)
    }

    /// Teachers a student can pick as chat partners
    async fn list_teachers(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ListTeachersQuery>,
    ) -> Result<Response, AppError> {
        resources.authenticate(&headers).await?;
        let teachers: Vec<Account> = match optional_text(query.subject.as_deref()) {
            Some(subject) => {
                resources
                    .directory
                    .find_by_role_and_subject(Role::Teacher, &subject)
                    .await?
            }
            None => resources.directory.find_by_role(Role::Teacher).await?,
        };
        Ok((StatusCode::OK, Json(teachers)).into_response())
    }

    /// Ids of a teacher's students, or of a student's teachers
    async fn list_connections(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let requester = resources.authenticate(&headers).await?;
        let connected: Vec<AccountId> = resources
            .connections
            .for_requester(&requester)
            .await?
            .into_iter()
            .map(|c| if requester.is_teacher() { c.student } else { c.teacher })
            .collect();
        Ok((StatusCode::OK, Json(connected)).into_response())
    }

    async fn list_subjects() -> Json<&'static [&'static str]> {
        Json(CATALOG)
    }
}

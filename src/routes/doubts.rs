// ABOUTME: Doubt route handlers: raise, list, browse unassigned, view and accept
// ABOUTME: Thin HTTP adapter over the doubt lifecycle service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 TutorLink Contributors

use super::{json_body, path_id, resolve_account_refs};
use crate::errors::AppError;
use crate::models::{AccountId, DoubtFilter, DoubtId, NewDoubt};
use crate::resources::ServerResources;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

// ============================================================================
// Request Types
// ============================================================================

/// Body of `POST /doubts`
#[derive(Debug, Deserialize)]
pub struct CreateDoubtRequest {
    /// Subject the doubt belongs to
    #[serde(default)]
    pub subject: String,
    /// Short title
    #[serde(default)]
    pub title: String,
    /// Full description
    #[serde(default)]
    pub description: String,
    /// Teachers to assign up front, as ids or emails
    #[serde(default)]
    pub teachers: Vec<String>,
}

/// Query of `GET /doubts`
#[derive(Debug, Default, Deserialize)]
pub struct ListDoubtsQuery {
    /// Restrict to one student's doubts
    pub student: Option<String>,
}

// ============================================================================
// Doubt Routes
// ============================================================================

/// Doubt routes handler
pub struct DoubtRoutes;

impl DoubtRoutes {
    /// Create all doubt routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/doubts", post(Self::create_doubt).get(Self::list_doubts))
            .route("/doubts/unassigned", get(Self::list_unassigned))
            .route("/doubts/:doubt_id", get(Self::get_doubt))
            .route("/doubts/:doubt_id/accept", put(Self::accept_doubt))
            .with_state(resources)
    }

    async fn create_doubt(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        payload: Result<Json<CreateDoubtRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let requester = resources.authenticate(&headers).await?;
        let request = json_body(payload)?;

        let teachers = resolve_account_refs(resources.directory.as_ref(), &request.teachers).await?;
        let new_doubt = NewDoubt {
            subject: request.subject,
            title: request.title,
            description: request.description,
            teachers,
        };

        let doubt = resources.doubts.create_doubt(new_doubt, &requester).await?;
        Ok((StatusCode::CREATED, Json(doubt)).into_response())
    }

    async fn list_doubts(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ListDoubtsQuery>,
    ) -> Result<Response, AppError> {
        let requester = resources.authenticate(&headers).await?;

        let student = query
            .student
            .as_deref()
            .map(|raw| {
                raw.parse::<AccountId>()
                    .map_err(|_| AppError::invalid_input("student must be an account id"))
            })
            .transpose()?;

        let doubts = resources
            .doubts
            .list_doubts(&requester, DoubtFilter { student })
            .await?;
        Ok((StatusCode::OK, Json(doubts)).into_response())
    }

    async fn list_unassigned(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let requester = resources.authenticate(&headers).await?;
        let doubts = resources.doubts.list_unassigned_doubts(&requester).await?;
        Ok((StatusCode::OK, Json(doubts)).into_response())
    }

    async fn get_doubt(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(doubt_id): Path<String>,
    ) -> Result<Response, AppError> {
        let requester = resources.authenticate(&headers).await?;
        let id: DoubtId = path_id(&doubt_id, "Doubt")?;
        let doubt = resources.doubts.get_doubt(id, &requester).await?;
        Ok((StatusCode::OK, Json(doubt)).into_response())
    }

    async fn accept_doubt(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(doubt_id): Path<String>,
    ) -> Result<Response, AppError> {
        let requester = resources.authenticate(&headers).await?;
        let id: DoubtId = path_id(&doubt_id, "Doubt")?;
        let accepted = resources.doubts.accept_doubt(id, &requester).await?;
        Ok((StatusCode::OK, Json(accepted)).into_response())
    }
}
